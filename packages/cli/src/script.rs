//! Editing scripts for `lectern edit`.
//!
//! One step per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! select 0.0:5            # caret
//! select 0.0:0 0.0:5      # anchor and focus
//! select all
//! type Hello world
//! paste first line\nsecond line
//! key Ctrl+b
//! mark italic
//! block heading-one
//! move -3
//! extend 2
//! link https://docs.dev optional text
//! edit-link 0.1 https://new.dev
//! image figures/cat.png
//! image-url https://img.dev/cat.png
//! remove-image 2
//! undo
//! redo
//! ```

use lectern_editor::{BlockFormat, KeyEvent};
use lectern_model::{Mark, Path, Point, Range};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Type(String),
    Paste(String),
    Key(KeyEvent),
    Mark(Mark),
    Block(BlockFormat),
    Select(Range),
    SelectAll,
    Move(isize),
    Extend(isize),
    Link { url: String, text: Option<String> },
    EditLink { path: Path, url: String },
    Image(PathBuf),
    ImageUrl(String),
    RemoveImage(Path),
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: Step,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_step(trimmed).map_err(|message| ScriptError { line, message })?;
        steps.push(ScriptLine { line, step });
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step, String> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line, ""),
    };
    // Comments after arguments, except for text-carrying steps
    let args = strip_comment(rest);

    let step = match command {
        "type" => Step::Type(required(rest, "text")?.to_string()),
        "paste" => Step::Paste(required(rest, "text")?.replace("\\n", "\n")),
        "key" => Step::Key(required(args, "key chord")?.parse().map_err(|e| format!("{e}"))?),
        "mark" => {
            let name = required(args, "mark name")?;
            Step::Mark(Mark::from_name(name).ok_or_else(|| format!("unknown mark `{name}`"))?)
        }
        "block" => {
            let name = required(args, "block format")?;
            Step::Block(BlockFormat::from_name(name).ok_or_else(|| format!("unknown block format `{name}`"))?)
        }
        "select" => match args.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["all"] => Step::SelectAll,
            [point] => Step::Select(Range::collapsed(parse_point(point)?)),
            [anchor, focus] => Step::Select(Range::new(parse_point(anchor)?, parse_point(focus)?)),
            _ => return Err("select takes `all`, a point, or two points".to_string()),
        },
        "move" => Step::Move(parse_delta(args)?),
        "extend" => Step::Extend(parse_delta(args)?),
        "link" => {
            let (url, text) = match required(rest, "url")?.split_once(char::is_whitespace) {
                Some((url, text)) => (url, Some(text.trim().to_string())),
                None => (rest, None),
            };
            Step::Link { url: url.to_string(), text }
        }
        "edit-link" => match args.split_whitespace().collect::<Vec<_>>().as_slice() {
            [path, url] => Step::EditLink { path: parse_path(path)?, url: url.to_string() },
            _ => return Err("edit-link takes a path and a url".to_string()),
        },
        "image" => Step::Image(PathBuf::from(required(args, "file")?)),
        "image-url" => Step::ImageUrl(required(args, "url")?.to_string()),
        "remove-image" => Step::RemoveImage(parse_path(required(args, "path")?)?),
        "undo" => Step::Undo,
        "redo" => Step::Redo,
        _ => return Err(format!("unknown step `{command}`")),
    };
    Ok(step)
}

fn strip_comment(args: &str) -> &str {
    match args.find(" #") {
        Some(index) => args[..index].trim_end(),
        None => args.trim_end(),
    }
}

fn required<'a>(args: &'a str, what: &str) -> Result<&'a str, String> {
    if args.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(args)
    }
}

fn parse_path(s: &str) -> Result<Path, String> {
    s.parse::<Path>().map_err(|e| format!("bad path `{s}`: {e}"))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (path, offset) = s
        .split_once(':')
        .ok_or_else(|| format!("point `{s}` must look like `0.1:4`"))?;
    let offset = offset
        .parse::<usize>()
        .map_err(|_| format!("bad offset in `{s}`"))?;
    Ok(Point::new(parse_path(path)?, offset))
}

fn parse_delta(s: &str) -> Result<isize, String> {
    s.parse::<isize>().map_err(|_| format!("expected a step count, found `{s}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let script = parse_script(
            "# setup\n\
             select 0.0:1\n\
             type Hello # world\n\
             key Ctrl+b\n\
             block bulleted-list\n\
             select 0.0:0 0.0:3 # first word\n\
             link https://x.dev the site\n\
             move -2\n\
             undo\n",
        )
        .unwrap();
        assert_eq!(script.len(), 8);
        assert_eq!(script[0].line, 2);
        assert_eq!(script[0].step, Step::Select(Range::collapsed(Point::new([0, 0], 1))));
        assert_eq!(script[1].step, Step::Type("Hello # world".to_string()));
        assert_eq!(script[2].step, Step::Key(KeyEvent::ctrl('b')));
        assert_eq!(script[3].step, Step::Block(BlockFormat::BulletedList));
        assert_eq!(
            script[4].step,
            Step::Select(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 3)))
        );
        assert_eq!(
            script[5].step,
            Step::Link { url: "https://x.dev".to_string(), text: Some("the site".to_string()) }
        );
        assert_eq!(script[6].step, Step::Move(-2));
        assert_eq!(script[7].step, Step::Undo);
    }

    #[test]
    fn test_paste_unescapes_newlines() {
        let script = parse_script("paste a\\nb").unwrap();
        assert_eq!(script[0].step, Step::Paste("a\nb".to_string()));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_script("undo\n\nmark sparkle").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unknown mark `sparkle`");
        assert!(parse_script("select 0.0").is_err());
        assert!(parse_script("dance").is_err());
    }
}
