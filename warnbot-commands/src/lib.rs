pub mod moderation;

use warnbot_core::{Data, Error};

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![moderation::warn::warn()]
}
