use serde::Serialize;
use storypage_core::error::StoryPageError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), StoryPageError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
