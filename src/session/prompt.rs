//! Reading and classifying user input. Each prompt maps a raw line into a [Reply], flows decide
//! what `Back` and `Invalid` mean for their own state.

use tracing::debug;

use crate::catalog::{Catalog, DifficultyPreset};

use super::{console::Console, SessionError};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Value(T),
    Back,
    Invalid,
}

fn is_back(input: &str) -> bool {
    matches!(input, "b" | "back")
}

/// Parses a 1-based menu index into a 0-based one.
pub fn parse_index(input: &str, len: usize) -> Reply<usize> {
    let input = input.trim();
    if is_back(input) {
        return Reply::Back;
    }
    match input.parse::<usize>() {
        Ok(index) if (1..=len).contains(&index) => Reply::Value(index - 1),
        _ => Reply::Invalid,
    }
}

/// Accepts finite, non-negative numbers only.
pub fn parse_quantity(input: &str) -> Reply<f64> {
    let input = input.trim();
    if is_back(input) {
        return Reply::Back;
    }
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0. => Reply::Value(value),
        _ => Reply::Invalid,
    }
}

pub fn parse_confirmation(input: &str) -> Reply<()> {
    match input.trim() {
        "y" | "Y" => Reply::Value(()),
        input if is_back(input) => Reply::Back,
        _ => Reply::Invalid,
    }
}

pub async fn ask<C: Console + ?Sized>(
    console: &mut C,
    prompt: &str,
) -> Result<String, SessionError> {
    console.say(prompt);
    console.read_line().await?.ok_or(SessionError::InputClosed)
}

/// Asks until the answer is either a confirmation or a step back.
pub async fn confirm<C: Console + ?Sized>(
    console: &mut C,
    prompt: &str,
) -> Result<bool, SessionError> {
    loop {
        let line = ask(console, prompt).await?;
        match parse_confirmation(&line) {
            Reply::Value(()) => return Ok(true),
            Reply::Back => return Ok(false),
            Reply::Invalid => debug!("Ignoring confirmation input {line:?}"),
        }
    }
}

/// Single chance opt-in. Anything but an explicit `y` declines.
pub async fn opt_in<C: Console + ?Sized>(
    console: &mut C,
    prompt: &str,
) -> Result<bool, SessionError> {
    let line = ask(console, prompt).await?;
    Ok(parse_confirmation(&line) == Reply::Value(()))
}

pub fn describe_preset<C: Console + ?Sized>(console: &mut C, preset: &DifficultyPreset) {
    for (activity, goal) in &preset.goals {
        console.say(&format!("\t- {activity}: {goal}"));
    }
}

/// Shared difficulty picker. Out of range and non numeric input re-prompt the same screen.
/// Returns `None` only if `allow_back` is set and the user stepped back.
pub async fn select_preset<C: Console + ?Sized>(
    console: &mut C,
    catalog: &Catalog,
    allow_back: bool,
) -> Result<Option<DifficultyPreset>, SessionError> {
    loop {
        console.say("\nSelect a difficulty level for your mission:");
        for (index, preset) in catalog.presets().iter().enumerate() {
            console.say(&format!("[{}] {}", index + 1, preset.id.to_uppercase()));
            describe_preset(console, preset);
        }
        let prompt = if allow_back {
            "Enter the [number] corresponding to your mission choice, or 'b' to go back"
        } else {
            "Enter the [number] corresponding to your mission choice"
        };

        let line = ask(console, prompt).await?;
        match parse_index(&line, catalog.presets().len()) {
            Reply::Value(index) => return Ok(catalog.presets().get(index).cloned()),
            Reply::Back if allow_back => return Ok(None),
            Reply::Back | Reply::Invalid => {
                debug!("Invalid difficulty selection {line:?}");
                console.error("Invalid selection");
            }
        }
    }
}
