//! Stdin command input standing in for the kiosk's buttons, keys, and
//! swipe gestures.

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::events::ControlEvent;
use crate::sort::{Direction, SortBy};

const HELP: &str = "commands: n(ext)  p(rev)  t(oggle play)  g(oto) N  i(nterval) SECS  \
m(argin) PCT|+|-  o(rder) name|modified|random [asc|desc]  a(udio)  w(rite settings)  q(uit)";

pub async fn run(control_tx: Sender<ControlEvent>, cancel: CancellationToken) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => {
                let Some(raw) = line? else { break };
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse_command(trimmed) {
                    Some(event) => {
                        if control_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => println!("{HELP}"),
                }
            }
        }
    }
    Ok(())
}

fn parse_command(line: &str) -> Option<ControlEvent> {
    let mut parts = line.split_whitespace();
    let event = match parts.next()? {
        "n" | "next" => ControlEvent::Next,
        "p" | "prev" => ControlEvent::Prev,
        "t" | "toggle" | "play" | "pause" => ControlEvent::TogglePlay,
        "g" | "goto" => {
            // Positions are 1-based on screen.
            let position: i64 = parts.next()?.parse().ok()?;
            ControlEvent::Goto(position - 1)
        }
        "i" | "interval" => {
            let secs: u64 = parts.next()?.parse().ok()?;
            ControlEvent::SetInterval(Duration::from_secs(secs.max(1)))
        }
        "m" | "margin" => match parts.next()? {
            "+" => ControlEvent::AdjustMargin(1),
            "-" => ControlEvent::AdjustMargin(-1),
            raw => ControlEvent::SetMargin(raw.parse().ok()?),
        },
        "o" | "order" | "sort" => {
            let by = match parts.next()? {
                "name" => SortBy::Name,
                "modified" => SortBy::Modified,
                "random" => SortBy::Random,
                _ => return None,
            };
            let direction = match parts.next() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(_) => return None,
            };
            ControlEvent::SetSort(by, direction)
        }
        "a" | "audio" => ControlEvent::ToggleAudio,
        "w" | "save" => ControlEvent::SaveSettings,
        "q" | "quit" => ControlEvent::Quit,
        _ => return None,
    };
    Some(event)
}
