use genrematch_core::{Entry, Outcome};
use std::io::{self, Write};

pub fn entry<W: Write>(out: &mut W, entry: &Entry) -> io::Result<()> {
    writeln!(out, "- {} ({}) - rating: {:.1}", entry.title, entry.genre_text(), entry.rating)
}

/// `filtered` selects the message for an empty result list.
pub fn outcome<W: Write>(out: &mut W, outcome: &Outcome<'_>, filtered: bool) -> io::Result<()> {
    match outcome {
        Outcome::Recommended { results, .. } if results.is_empty() => {
            if filtered {
                writeln!(out, "No movies matched the filters.")
            } else {
                writeln!(out, "No recommendations found.")
            }
        }
        Outcome::Recommended { resolved, results } => {
            writeln!(out, "Movies similar to {}:", resolved.title)?;
            for r in results {
                entry(out, r.entry)?;
            }
            Ok(())
        }
        Outcome::DidYouMean(suggestions) => {
            writeln!(out, "Title not found. Did you mean:")?;
            for (i, s) in suggestions.iter().enumerate() {
                writeln!(out, "{}. {}", i + 1, s.title)?;
            }
            Ok(())
        }
        Outcome::NotFound => writeln!(out, "No recommendations found."),
    }
}
