use std::io::{self, BufRead, Write};

use anyhow::Result;
use chess_game::{render_board, render_history, render_status, Command, GameSession, GameSettings};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let mut settings = GameSettings::load();

    // 初始化日志
    let level = settings.log_level.as_directive();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("chess_game={}", level).parse()?)
                .add_directive(format!("removal_chess={}", level).parse()?),
        )
        .init();

    info!("移格国际象棋启动中...");

    let mut session = GameSession::new(&settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}\n{}", render_board(&session), render_status(&session));

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{:#}", e);
                continue;
            }
        };

        let result = match command {
            Command::Moves(from) => {
                let targets: Vec<String> = session
                    .legal_destinations(from)
                    .iter()
                    .map(|pos| pos.to_string())
                    .collect();
                println!("{}", targets.join(" "));
                continue;
            }
            Command::Move(from, to) => session.play_move(from, to).map(|_| ()),
            Command::Remove(pos) => session.remove_square(pos),
            Command::Select(piece) => session.select_draft_piece(piece),
            Command::Place(pos) => session.place_draft_piece(pos),
            Command::Show => {
                session.check_timeout();
                Ok(())
            }
            Command::History => {
                println!("{}", render_history(&session));
                continue;
            }
            Command::Settings => {
                println!("{}", settings.describe());
                continue;
            }
            Command::Set(key) => {
                settings.cycle(key);
                if let Err(e) = settings.save() {
                    warn!("{:#}", e);
                }
                println!("{}", settings.describe());
                if session.has_started() {
                    println!("settings apply to the next game");
                    continue;
                }
                session = GameSession::new(&settings);
                Ok(())
            }
            Command::Help => {
                println!("{}", chess_game::console::HELP);
                continue;
            }
            Command::Quit => break,
        };

        if let Err(e) = result {
            println!("{}", e);
        }
        println!("{}\n{}", render_board(&session), render_status(&session));

        if session.state().is_over() {
            break;
        }
    }

    if let Some(outcome) = session.state().outcome() {
        info!("对局结束: {} 获胜 ({:?})", outcome.winner, outcome.reason);
    } else {
        warn!("对局未完成即退出");
    }

    Ok(())
}
