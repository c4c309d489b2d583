fn main() -> anyhow::Result<()> {
    muxtree::cli::run_cli()
}
