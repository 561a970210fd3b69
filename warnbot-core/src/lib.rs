use warnbot_database::WarnBackend;

pub type Error = anyhow::Error;

/// State shared with every command invocation.
#[derive(Clone, Debug)]
pub struct Data {
    pub store: WarnBackend,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
