fn main() -> anyhow::Result<()> {
    benchbox::cli::main()
}
