//! A bot generated by the build script rather than the `#[bot]` macro.

#[derive(Default)]
pub struct Info;

#[magicord::declare::bot(token = "info-token")]
impl Info {
    /// Replies with the demo version.
    #[prefix_command]
    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    #[prefix_command]
    fn whoami(&self, event: &magicord::MessageCreateEvent) -> String {
        match event.author() {
            Some(author) => format!("You are {author}."),
            None => "I don't know who you are.".to_string(),
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/info/MagicordInfo.rs"));
