fn main() -> anyhow::Result<()> {
    facebot_app::run()
}
