fn main() -> anyhow::Result<()> {
    model_viewer::internal_main()
}
