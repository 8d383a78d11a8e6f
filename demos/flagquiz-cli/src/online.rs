//! Multiplayer rooms over WebSocket.

use std::error::Error;
use std::time::Duration;

use flagquiz::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;

use crate::flag_emoji;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How to get into a room.
pub(crate) enum Entry {
    Host(RoomSettings),
    Join(String),
}

/// Prints notifications on stdout.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, level: Level, message: &str) {
        println!("[{level}] {message}");
    }
}

pub(crate) async fn run(url: String, name: String, entry: Entry) -> Result<(), Box<dyn Error>> {
    let (client, mut events) = QuizClient::builder()
        .url(url.as_str())
        .notifier(PrintNotifier)
        .settings(StaticSettings {
            sound_effects: false,
        })
        .build_websocket();

    client.connect().await?;
    let mut state = client.subscribe_connection();
    if timeout(CONNECT_TIMEOUT, state.wait_for(|s| s.is_connected()))
        .await
        .is_err()
    {
        client.shutdown().await?;
        return Err(format!("could not connect to {url}").into());
    }

    match entry {
        Entry::Host(settings) => client.create_room(name, settings).await?,
        Entry::Join(code) => client.join_room(code, name).await?,
    }
    println!("Commands: start, stop, restart, leave, quit, or 1-4 to answer.");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::PhaseChanged(t)) => show_phase(&client.session(), t),
                Some(ClientEvent::TimeUp(TimerPurpose::QuestionCountdown)) => println!("Time's up!"),
                Some(ClientEvent::Superseded | ClientEvent::ReconnectFailed { .. }) | None => break,
                Some(_) => {}
            },
            line = input.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&client, line.trim()).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    client.shutdown().await?;
    Ok(())
}

/// Runs one typed command. Returns `false` to quit.
async fn handle_line(client: &QuizClient, line: &str) -> bool {
    let result = match line {
        "" => Ok(()),
        "start" => client.start_game().await,
        "stop" => client.stop_game().await,
        "restart" => client.restart_game().await,
        "leave" => {
            if let Err(e) = client.leave_room().await {
                eprintln!("{e}");
            }
            return false;
        }
        "quit" => return false,
        other => match pick(&client.session(), other) {
            Some(code) => client.submit_answer(code).await,
            None => {
                println!("Unknown command '{other}'");
                Ok(())
            }
        },
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
    true
}

/// Maps an option number to the country code on screen.
fn pick(session: &Session, line: &str) -> Option<CountryCode> {
    let n: usize = line.parse().ok()?;
    let question = session.game()?.current_question.as_ref()?;
    question.options.get(n.checked_sub(1)?).map(|c| c.code.clone())
}

fn show_phase(session: &Session, transition: Transition) {
    let (Some(phase), Some(room)) = (transition.to, session.room()) else {
        println!("You are no longer in a room.");
        return;
    };
    let game = &room.game_state;

    match phase {
        GamePhase::Waiting => {
            println!("Room {} ({} players)", room.invite_code, room.members.len());
            for member in &room.members {
                let tag = if member.is_host { " (host)" } else { "" };
                println!("  {}{tag}", member.username);
            }
            if session.is_host() {
                println!("Type 'start' when everyone is here.");
            }
        }
        GamePhase::Starting => {
            let secs = game.phase_timer.map_or(0, |t| t.duration);
            println!("Game starting in {secs}s...");
        }
        GamePhase::Question => {
            if let Some(q) = &game.current_question {
                println!(
                    "\nQuestion {}/{}: {}",
                    q.question_number,
                    game.total_questions,
                    flag_emoji(&q.country.code)
                );
                for (i, country) in q.options.iter().enumerate() {
                    println!("  {}. {}", i + 1, country.name);
                }
            }
        }
        GamePhase::Results | GamePhase::Finished => {
            if let (GamePhase::Results, Some(q)) = (phase, &game.current_question) {
                println!("It was {}.", q.country.name);
            } else {
                println!("\nFinal standings:");
            }
            print_leaderboard(&game.leaderboard);
        }
    }
}

fn print_leaderboard(leaderboard: &[LeaderboardEntry]) {
    for entry in leaderboard {
        println!("  {:>2}. {:<16} {}", entry.rank, entry.username, entry.score);
    }
}
