fn main() -> anyhow::Result<()> {
    magicord_processor::build_script(["src/info.rs"])?;
    Ok(())
}
