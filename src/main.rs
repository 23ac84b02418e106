use hexsweeper::{
    Cell, Difficulty, GameConfig, Grid, HighScores, JsonLinesSink, Position, RevealOutcome,
    ScoreSink, Session, Status, Topology,
};
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SCORE_FILE: &str = "highscores.jsonl";

enum Command {
    Reveal(Position),
    Flag(Position),
    Quit,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run() {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut high_scores = HighScores::new();

    loop {
        let config = choose_config()?;
        let seed = rand::random::<u64>();
        info!(?config, seed, "starting game");

        let mut session = Session::new(&config, seed)?;
        play(&mut session)?;

        print_board(session.grid(), true);
        match session.status() {
            Status::Won => {
                println!("You win! Score: {}", session.score().unwrap_or_default());
                let name = prompt("What is your name? ")?;
                if let Some(record) = session.score_record(name.trim()) {
                    if let Err(e) = save_score(&record) {
                        warn!("could not save score: {}", e);
                    }
                    high_scores.submit(record)?;
                }
            }
            Status::Lost => println!("Game Over!"),
            Status::InProgress => println!("Game abandoned."),
        }

        print_high_scores(&high_scores);
        if !prompt("Play again? [y/N] ")?.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }
}

fn play(session: &mut Session) -> io::Result<()> {
    let mut last_tick = Instant::now();

    while session.status() == Status::InProgress {
        print_status(session);
        print_board(session.grid(), false);

        let input = prompt("Enter command (x y [r/f], q to quit): ")?;

        // The clock keeps running while the player thinks.
        let elapsed = last_tick.elapsed().as_secs();
        last_tick += Duration::from_secs(elapsed);
        for _ in 0..elapsed {
            if session.tick().is_terminal() {
                println!("Out of time!");
                return Ok(());
            }
        }

        match parse_command(&input) {
            Some(Command::Quit) => return Ok(()),
            Some(Command::Reveal(pos)) => {
                if session.reveal(pos).outcome == RevealOutcome::NoOp {
                    println!("Nothing to reveal at ({}, {})", pos.x, pos.y);
                }
            }
            Some(Command::Flag(pos)) => {
                session.toggle_flag(pos);
            }
            None => println!("Invalid command. Use 'x y r' to reveal or 'x y f' to flag"),
        }
    }

    Ok(())
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    let first = parts.next()?;
    if first.eq_ignore_ascii_case("q") {
        return Some(Command::Quit);
    }

    let x = first.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let pos = Position::new(x, y);

    match parts.next().and_then(|s| s.chars().next()) {
        Some('r') | None => Some(Command::Reveal(pos)),
        Some('f') => Some(Command::Flag(pos)),
        _ => None,
    }
}

fn choose_config() -> io::Result<GameConfig> {
    let topology = loop {
        match prompt("Board type (normal/hex): ")?.parse::<Topology>() {
            Ok(topology) => break topology,
            Err(e) => println!("{}", e),
        }
    };
    let difficulty = loop {
        match prompt("Difficulty (easy/medium/hard/super-hard): ")?.parse::<Difficulty>() {
            Ok(difficulty) => break difficulty,
            Err(e) => println!("{}", e),
        }
    };
    Ok(GameConfig::preset(topology, difficulty))
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(input)
}

fn save_score(record: &hexsweeper::ScoreRecord) -> Result<(), hexsweeper::ScoreError> {
    let file = OpenOptions::new().create(true).append(true).open(SCORE_FILE)?;
    JsonLinesSink::new(file).submit(record.clone())
}

fn print_status(session: &Session) {
    println!(
        "Time: {}  Mines left: {}",
        session.time_remaining(),
        session.grid().mines_left()
    );
}

fn glyph(cell: Cell, show_mines: bool) -> String {
    match cell {
        Cell { flagged: true, .. } => "⚑".to_string(),
        Cell { mined: true, .. } if show_mines => "*".to_string(),
        Cell { covered: true, .. } => "□".to_string(),
        Cell {
            adjacent_count: 0, ..
        } => " ".to_string(),
        Cell { adjacent_count, .. } => adjacent_count.to_string(),
    }
}

fn print_board(grid: &Grid, show_mines: bool) {
    let (width, height) = grid.dimensions();

    // Print column numbers
    print!("    ");
    for x in 0..width {
        print!("{:<2}", x % 10);
    }
    println!();

    let cell = |x: u32, y: u32| {
        grid.cell(Position::new(x as i32, y as i32))
            .map(|c| glyph(c, show_mines))
            .unwrap_or_default()
    };

    for y in 0..height {
        match grid.topology() {
            Topology::Orthogonal => {
                print!("{:>3} ", y);
                for x in 0..width {
                    print!("{} ", cell(x, y));
                }
                println!();
            }
            // Odd columns sit half a row lower, so each row spans two lines.
            Topology::Hex => {
                for odd in [false, true] {
                    if odd {
                        print!("    ");
                    } else {
                        print!("{:>3} ", y);
                    }
                    for x in 0..width {
                        if (x % 2 == 1) == odd {
                            print!("{} ", cell(x, y));
                        } else {
                            print!("  ");
                        }
                    }
                    println!();
                }
            }
        }
    }
}

fn print_high_scores(high_scores: &HighScores) {
    if high_scores.is_empty() {
        return;
    }
    println!("High scores:");
    for record in high_scores.records() {
        println!(
            "  {:<12} {:>4}  {} {}x{} ({} mines)",
            record.player_name,
            record.score,
            record.topology,
            record.width,
            record.height,
            record.mine_count
        );
    }
}
