use crate::render;
use anyhow::Result;
use genrematch_core::{EngineState, Outcome, RecommendRequest};
use std::io::{BufRead, Write};

const QUIT_WORDS: &[&str] = &["quit", "exit"];

/// Read one line, trimmed. `None` on end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    read_line(input)
}

/// Ask for a minimum rating until the answer is blank or parses.
fn prompt_rating<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<f32>> {
    loop {
        match prompt(input, out, "Minimum rating, e.g. 7.0 (Enter to skip): ")? {
            None => return Ok(None),
            Some(s) if s.is_empty() => return Ok(None),
            Some(s) => match s.parse::<f32>() {
                Ok(r) => return Ok(Some(r)),
                Err(_) => writeln!(out, "Invalid rating: {s}")?,
            },
        }
    }
}

/// Prompt loop: title, genre filter, minimum rating, then results or a pick from suggestions.
pub fn run<R: BufRead, W: Write>(state: &EngineState, n: usize, mut input: R, mut out: W) -> Result<()> {
    let genres = state.genres().join(", ");
    loop {
        writeln!(out, "\nType 'quit' to exit.")?;
        let Some(title) = prompt(&mut input, &mut out, "Movie title: ")? else { break };
        if QUIT_WORDS.contains(&title.to_lowercase().as_str()) {
            writeln!(out, "Goodbye.")?;
            break;
        }
        if title.is_empty() {
            continue;
        }

        writeln!(out, "Available genres: {genres}")?;
        let genre = prompt(&mut input, &mut out, "Filter by genre (Enter to skip): ")?.filter(|g| !g.is_empty());
        let min_rating = prompt_rating(&mut input, &mut out)?;

        let mut req = RecommendRequest::new(title).with_n(n);
        req.filter.genre = genre;
        req.filter.min_rating = min_rating;

        let filtered = req.filter.is_active();
        let outcome = state.recommend(&req)?;
        if let Outcome::DidYouMean(suggestions) = &outcome {
            render::outcome(&mut out, &outcome, filtered)?;
            let choice = prompt(&mut input, &mut out, "Choose a number (0 to cancel): ")?;
            let picked = choice
                .and_then(|c| c.parse::<usize>().ok())
                .filter(|&i| i >= 1 && i <= suggestions.len())
                .map(|i| suggestions[i - 1].row);
            let Some(row) = picked else {
                writeln!(out, "Cancelled.")?;
                continue;
            };
            // rank the picked row itself; its title may be shared by other rows
            let retry = state.recommend_row(row, &req)?;
            render::outcome(&mut out, &retry, filtered)?;
            continue;
        }
        render::outcome(&mut out, &outcome, filtered)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genrematch_core::{Catalog, Entry};
    use std::io::Cursor;

    fn state() -> EngineState {
        EngineState::build(
            Catalog::new(vec![
                Entry::new("tt1", "Heat", ["Crime", "Drama"], 8.3),
                Entry::new("tt2", "Casino", ["Crime", "Drama"], 8.2),
                Entry::new("tt3", "Airplane!", ["Comedy"], 7.7),
            ])
            .unwrap(),
        )
        .unwrap()
    }

    fn session(script: &str) -> String {
        let mut out = Vec::new();
        run(&state(), 5, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn recommends_then_quits() {
        let out = session("heat\n\n\nquit\n");
        assert!(out.contains("Available genres: Comedy, Crime, Drama"));
        assert!(out.contains("- Casino (Crime,Drama) - rating: 8.2"));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn picks_a_suggestion() {
        let out = session("casinoo\n\n\n1\n");
        assert!(out.contains("1. Casino"));
        assert!(out.contains("Movies similar to Casino:"));
        assert!(out.contains("- Heat (Crime,Drama) - rating: 8.3"));
    }

    #[test]
    fn picked_duplicate_title_keeps_its_own_genres() {
        let state = EngineState::build(
            Catalog::new(vec![
                Entry::new("a", "Crash", ["Drama"], 7.7),
                Entry::new("b", "Crash", ["Thriller"], 6.4),
                Entry::new("c", "Duel", ["Thriller"], 7.6),
            ])
            .unwrap(),
        )
        .unwrap();
        let mut out = Vec::new();
        run(&state, 1, Cursor::new("crashh\n\n\n2\n".to_string()), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("1. Crash\n2. Crash\n"));
        assert!(out.contains("- Duel (Thriller) - rating: 7.6"));
    }

    #[test]
    fn unfiltered_empty_list_is_not_blamed_on_filters() {
        let state = EngineState::build(Catalog::new(vec![Entry::new("a", "Solo", ["Drama"], 7.0)]).unwrap()).unwrap();
        let mut out = Vec::new();
        run(&state, 5, Cursor::new("solo\n\n\n".to_string()), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No recommendations found."));
    }

    #[test]
    fn cancels_on_bad_choice_and_reprompts_rating() {
        let out = session("casinoo\n\nabc\n7\nx\nexit\n");
        assert!(out.contains("Invalid rating: abc"));
        assert!(out.contains("Cancelled."));
    }

    #[test]
    fn reports_empty_filtered_results() {
        let out = session("heat\nwestern\n\n");
        assert!(out.contains("No movies matched the filters."));
    }
}
