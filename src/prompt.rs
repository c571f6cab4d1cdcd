use std::io::{self, BufRead, Write};

use crate::config::{normalize_city, title_case, CityRegistry};
use crate::data::filter::{DayFilter, MonthFilter, TripFilter};
use crate::error::{BikeshareError, Result};

pub const DIVIDER: &str = "**************************************************";

/// What the operator asked to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoice {
    /// Canonical lowercase registry key.
    pub city: String,
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterChoice {
    pub fn filter(&self) -> TripFilter {
        TripFilter::new(self.month, self.day)
    }
}

/// Line-based conversation with the operator.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Ask for city, month and day until each answer is valid.
    pub fn collect_filters(&mut self, registry: &CityRegistry) -> Result<FilterChoice> {
        writeln!(self.output)?;
        writeln!(self.output, "{DIVIDER}")?;
        writeln!(self.output, "👋 Hey! Let's explore some U.S. bike share data!")?;
        writeln!(self.output, "{DIVIDER}")?;

        let city = self.ask_city(registry)?;
        let month = self.ask_until_valid::<MonthFilter>(
            "Enter a month to filter on (January-June), or leave it blank to select all months. ",
        )?;
        let day = self.ask_until_valid::<DayFilter>(
            "Enter a day of the week to filter on, or leave it blank to select all days. ",
        )?;

        Ok(FilterChoice { city, month, day })
    }

    /// `true` when the operator answers `y` or `yes`.
    pub fn ask_restart(&mut self) -> Result<bool> {
        let answer = self.ask("\nWould you like to run this again? Enter Y or N\n")?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    /// Write a line of operator-facing text.
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn ask_city(&mut self, registry: &CityRegistry) -> Result<String> {
        let question = format!(
            "Would you like to see data for {}? ",
            registry.display_list()
        );
        loop {
            let answer = self.ask(&question)?;
            match validate_city(registry, &answer) {
                Ok(city) => {
                    writeln!(self.output, "✅ You've chosen \"{}\".", title_case(&city))?;
                    return Ok(city);
                }
                Err(e) => writeln!(self.output, "❌ {e}")?,
            }
        }
    }

    fn ask_until_valid<T>(&mut self, question: &str) -> Result<T>
    where
        T: std::str::FromStr<Err = BikeshareError> + std::fmt::Display,
    {
        loop {
            let answer = self.ask(question)?;
            match answer.parse::<T>() {
                Ok(value) if answer.trim().is_empty() => {
                    writeln!(self.output, "✅ No input entered, using \"all\".")?;
                    return Ok(value);
                }
                Ok(value) => {
                    writeln!(
                        self.output,
                        "✅ You've chosen \"{}\".",
                        title_case(&value.to_string())
                    )?;
                    return Ok(value);
                }
                Err(e) => writeln!(self.output, "❌ Sorry, {e}. Choose another?")?,
            }
        }
    }

    /// Print `question` and read one line, asking again while the line is
    /// unreadable. End of input is `InputClosed`.
    fn ask(&mut self, question: &str) -> Result<String> {
        loop {
            match self.read_answer(question) {
                Err(BikeshareError::Validation(msg)) => writeln!(self.output, "❌ {msg}")?,
                other => return other,
            }
        }
    }

    fn read_answer(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Err(BikeshareError::InputClosed),
            Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(BikeshareError::Validation(
                "That answer is not valid text. Please type it again.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Normalise a city answer and check it against the registry.
pub fn validate_city(registry: &CityRegistry, answer: &str) -> Result<String> {
    let city = normalize_city(answer);
    if city.is_empty() {
        return Err(BikeshareError::Validation(
            "A city name is required.".to_string(),
        ));
    }
    if !registry.contains(&city) {
        return Err(BikeshareError::Validation(
            "Sorry, we don't have data for that city yet. Choose another?".to_string(),
        ));
    }
    Ok(city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Month;
    use chrono::Weekday;
    use std::io::Cursor;
    use std::path::Path;

    fn run(script: &str) -> (Result<FilterChoice>, String) {
        let registry = CityRegistry::bundled(Path::new("."));
        let mut out = Vec::new();
        let result = {
            let mut prompter = Prompter::new(Cursor::new(script.to_string()), &mut out);
            prompter.collect_filters(&registry)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_city_is_case_insensitive_and_trimmed() {
        for token in ["chicago", "  CHICAGO ", "New York City", "wAsHiNgToN\t"] {
            let (result, _) = run(&format!("{token}\n\n\n"));
            let choice = result.unwrap();
            assert_eq!(choice.city, normalize_city(token));
        }
    }

    #[test]
    fn test_city_reprompts_until_recognized() {
        let (result, out) = run("\nboston\n  \nnew york city\nmarch\nmonday\n");
        assert_eq!(
            result.unwrap(),
            FilterChoice {
                city: "new york city".to_string(),
                month: MonthFilter::Only(Month::March),
                day: DayFilter::Only(Weekday::Mon),
            }
        );
        assert_eq!(out.matches("A city name is required.").count(), 2);
        assert_eq!(out.matches("don't have data for that city").count(), 1);
        assert!(out.contains("You've chosen \"New York City\"."));
        assert!(out.contains("You've chosen \"March\"."));
        assert!(out.contains("You've chosen \"Monday\"."));
    }

    #[test]
    fn test_unrecognized_city_never_returns() {
        let (result, _) = run("paris\nlondon\n");
        assert!(matches!(result, Err(BikeshareError::InputClosed)));
    }

    #[test]
    fn test_blank_month_and_day_mean_all() {
        let (result, out) = run("chicago\n\n   \n");
        let choice = result.unwrap();
        assert_eq!(choice.month, MonthFilter::All);
        assert_eq!(choice.day, DayFilter::All);
        assert_eq!(out.matches("No input entered").count(), 2);
    }

    #[test]
    fn test_invalid_month_and_day_reprompt() {
        let (result, out) = run("chicago\njuly\nJune\nfunday\nSATURDAY\n");
        let choice = result.unwrap();
        assert_eq!(choice.month, MonthFilter::Only(Month::June));
        assert_eq!(choice.day, DayFilter::Only(Weekday::Sat));
        assert!(out.contains("'july' is not a valid month filter"));
        assert!(out.contains("'funday' is not a valid day filter"));
    }

    #[test]
    fn test_unreadable_line_is_asked_again() {
        let registry = CityRegistry::bundled(Path::new("."));
        let mut script = b"\xff\xfe chicago\n".to_vec();
        script.extend_from_slice(b"Chicago\n\xc3\n\nfriday\n");
        let mut out = Vec::new();
        let choice = Prompter::new(Cursor::new(script), &mut out)
            .collect_filters(&registry)
            .unwrap();

        assert_eq!(choice.city, "chicago");
        assert_eq!(choice.month, MonthFilter::All);
        assert_eq!(choice.day, DayFilter::Only(Weekday::Fri));
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("not valid text").count(), 2);
    }

    #[test]
    fn test_restart_answers() {
        for (answer, expected) in [
            ("y", true),
            ("YES", true),
            (" Yes ", true),
            ("n", false),
            ("", false),
            ("sure", false),
        ] {
            let mut prompter = Prompter::new(Cursor::new(format!("{answer}\n")), Vec::new());
            assert_eq!(prompter.ask_restart().unwrap(), expected, "answer {answer:?}");
        }
    }

    #[test]
    fn test_restart_on_closed_input() {
        let mut prompter = Prompter::new(Cursor::new(String::new()), Vec::new());
        assert!(matches!(
            prompter.ask_restart(),
            Err(BikeshareError::InputClosed)
        ));
    }
}
