//! Terminal flag quiz.
//!
//! ```text
//! flagquiz solo --difficulty hard -n 10
//! flagquiz host --name ana --url ws://127.0.0.1:3001/ws
//! flagquiz join QZ4K2P --name ben
//! ```
//!
//! `RUST_LOG=debug` shows the client's internals on stderr.

mod online;
mod solo;

use clap::{Parser, Subcommand};
use flagquiz::prelude::*;

const DEFAULT_URL: &str = "ws://127.0.0.1:3001/ws";

#[derive(Parser, Debug)]
#[command(name = "flagquiz")]
#[command(about = "Guess the country from its flag", long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play alone with locally generated questions
    Solo {
        #[arg(short, long, default_value = "medium", value_parser = parse_difficulty)]
        difficulty: Difficulty,

        /// Number of questions
        #[arg(short = 'n', long, default_value_t = 10)]
        questions: u32,

        /// Seconds per question
        #[arg(short, long, default_value_t = 15)]
        time: u32,
    },
    /// Create a multiplayer room and host it
    Host {
        #[arg(long)]
        name: String,

        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,

        #[arg(short, long, default_value = "medium", value_parser = parse_difficulty)]
        difficulty: Difficulty,

        #[arg(short = 'n', long, default_value_t = 10)]
        questions: u32,
    },
    /// Join a multiplayer room by invite code
    Join {
        invite_code: String,

        #[arg(long)]
        name: String,

        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,
    },
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::ALL
        .into_iter()
        .find(|d| d.to_string().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown difficulty '{s}', expected easy, medium, hard or expert"))
}

/// The flag as a pair of regional indicator symbols, e.g. `fr` → 🇫🇷.
fn flag_emoji(code: &CountryCode) -> String {
    let code = code.as_str();
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_lowercase()) {
        return code.to_uppercase();
    }
    code.bytes()
        .filter_map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'a')))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    flagquiz::init_tracing("warn");
    let args = Args::parse();

    match args.mode {
        Mode::Solo {
            difficulty,
            questions,
            time,
        } => solo::run(difficulty, questions, time).await,
        Mode::Host {
            name,
            url,
            difficulty,
            questions,
        } => {
            let settings = RoomSettings {
                difficulty,
                question_count: questions,
                ..RoomSettings::default()
            };
            online::run(url, name, online::Entry::Host(settings)).await
        }
        Mode::Join {
            invite_code,
            name,
            url,
        } => online::run(url, name, online::Entry::Join(invite_code)).await,
    }
}
