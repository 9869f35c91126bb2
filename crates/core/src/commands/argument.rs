use super::argument_parser::*;

#[derive(Clone)]
pub enum ArgumentType {
    String,
    Integer { min: i32, max: i32 },
    GreedyString,
    /// A single word naming a hologram. Parses like `String`; completion
    /// offers the ids of registered holograms.
    HologramId,
}

impl ArgumentType {
    pub(super) fn parse<'a>(&self, input: &'a str) -> ArgumentParseResult<'a> {
        match self {
            ArgumentType::String | ArgumentType::HologramId => parse_string(input),
            ArgumentType::Integer { min, max } => {
                let (value, rest) = parse_integer(input)?;
                if let Ok(value) = value.as_integer() {
                    if !(*min..=*max).contains(&value) {
                        return Err(());
                    }
                }
                Ok((value, rest))
            }
            ArgumentType::GreedyString => parse_greedy_string(input),
        }
    }

    pub fn string() -> Self {
        ArgumentType::String
    }

    pub fn integer(min: i32, max: i32) -> Self {
        ArgumentType::Integer { min, max }
    }

    pub fn greedy_string() -> Self {
        ArgumentType::GreedyString
    }

    pub fn hologram_id() -> Self {
        ArgumentType::HologramId
    }
}
