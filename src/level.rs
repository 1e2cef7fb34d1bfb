//! XSB level text parsing.
//!
//! `#` wall, ` `/`-`/`_` floor, `.` goal, `$` box, `*` box on goal, `@` player,
//! `+` player on goal. Rows may be ragged; missing cells are floor.

use crate::error::{Result, SolverError};
use crate::map::{Cell, Map, PuzzleInstance, MAX_DIM};

/// A level of a collection file together with its title, if any.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: Option<String>,
    pub instance: PuzzleInstance,
}

pub fn parse_level(text: &str) -> Result<PuzzleInstance> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    parse_rows(&lines, 1)
}

/// Splits a collection into levels on blank lines. Lines starting with `;` are
/// comments; the last one before a level becomes its name.
pub fn parse_collection(text: &str) -> Result<Vec<Level>> {
    let mut levels = Vec::new();
    let mut name: Option<String> = None;
    let mut rows: Vec<&str> = Vec::new();
    let mut first_line = 1;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            flush(&mut levels, &mut name, &mut rows, first_line)?;
            continue;
        }
        if let Some(comment) = line.trim_start().strip_prefix(';') {
            flush(&mut levels, &mut name, &mut rows, first_line)?;
            name = Some(comment.trim().to_string());
            continue;
        }
        if rows.is_empty() {
            first_line = idx + 1;
        }
        rows.push(line);
    }
    flush(&mut levels, &mut name, &mut rows, first_line)?;

    Ok(levels)
}

fn flush<'a>(
    levels: &mut Vec<Level>,
    name: &mut Option<String>,
    rows: &mut Vec<&'a str>,
    first_line: usize,
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let instance = parse_rows(rows, first_line)?;
    levels.push(Level {
        name: name.take(),
        instance,
    });
    rows.clear();
    Ok(())
}

fn parse_rows(lines: &[&str], first_line: usize) -> Result<PuzzleInstance> {
    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let lines = &lines[..end];

    let rows = lines.len();
    let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    if rows > MAX_DIM || cols > MAX_DIM {
        return Err(SolverError::TooLarge { rows, cols });
    }

    let mut walls = Vec::new();
    let mut goals = Vec::new();
    let mut boxes = Vec::new();
    let mut player: Option<Cell> = None;

    for (row, line) in lines.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let cell = Cell::new(row as i16, col as i16);
            match ch {
                '#' => walls.push(cell),
                ' ' | '-' | '_' => {}
                '.' => goals.push(cell),
                '$' => boxes.push(cell),
                '*' => {
                    boxes.push(cell);
                    goals.push(cell);
                }
                '@' | '+' => {
                    if player.is_some() {
                        return Err(SolverError::Parse {
                            line: first_line + row,
                            message: "more than one player".to_string(),
                        });
                    }
                    player = Some(cell);
                    if ch == '+' {
                        goals.push(cell);
                    }
                }
                other => {
                    return Err(SolverError::Parse {
                        line: first_line + row,
                        message: format!("unexpected character {:?} at column {}", other, col + 1),
                    });
                }
            }
        }
    }

    let player = player.ok_or_else(|| SolverError::Parse {
        line: first_line,
        message: "no player (@ or +) found".to_string(),
    })?;

    let map = Map::new(rows, cols, walls, goals)?;
    PuzzleInstance::new(map, player, boxes)
}
