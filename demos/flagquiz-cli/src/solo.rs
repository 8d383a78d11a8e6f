//! Solo rounds: questions generated locally, answers read from stdin.

use std::error::Error;
use std::time::Duration;

use flagquiz::prelude::*;
use flagquiz::quiz::QuestionResult;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::timeout;

use crate::flag_emoji;

pub(crate) type Input = Lines<BufReader<Stdin>>;

pub(crate) async fn run(
    difficulty: Difficulty,
    questions: u32,
    time_per_question: u32,
) -> Result<(), Box<dyn Error>> {
    let clock = SystemClock;
    let mut rng = rand::rng();
    let mut game = SoloGame::new(DistractorSelector::default(), difficulty, questions);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let limit = Duration::from_secs(time_per_question.into());

    println!("Solo game: {questions} questions, {difficulty}, {time_per_question}s each.");
    println!("Type the number of your answer.\n");

    while let Some(question) = game.next_question(&mut rng, clock.now_ms()) {
        let target = question.target.clone();
        let options = question.options.clone();
        let number = game.history().len() + 1;

        println!("Question {number}/{questions}: {}", flag_emoji(&target.code));
        for (i, country) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, country.name);
        }

        let result: QuestionResult = match timeout(limit, read_choice(&mut input)).await {
            Ok(choice) => match choice? {
                Some(i) => game.answer(options[i].code.clone(), clock.now_ms())?.clone(),
                None => break,
            },
            Err(_) => match game.time_out(clock.now_ms()) {
                Some(result) => result.clone(),
                None => continue,
            },
        };

        match (&result.answer, result.is_correct) {
            (_, true) => println!("Correct!\n"),
            (Some(_), false) => println!("Wrong, it was {}.\n", target.name),
            (None, false) => println!("Time's up, it was {}.\n", target.name),
        }
    }

    print_summary(&game.summary());
    Ok(())
}

/// Reads lines until one is a valid option number. `None` on end of input.
pub(crate) async fn read_choice(input: &mut Input) -> std::io::Result<Option<usize>> {
    while let Some(line) = input.next_line().await? {
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=GameQuestion::OPTION_COUNT).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("Pick 1-{}", GameQuestion::OPTION_COUNT),
        }
    }
    Ok(None)
}

fn print_summary(summary: &GameSummary) {
    println!("Score: {}/{}", summary.correct, summary.total);
    println!("Accuracy: {:.0}%", summary.accuracy * 100.0);
    println!("Best streak: {}", summary.best_streak);
    println!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    if let Some(avg) = summary.average_response {
        println!("Average answer time: {:.1}s", avg.as_secs_f64());
    }
}
