fn main() -> anyhow::Result<()> {
    trialspak::cli::run_cli()
}
