use std::{fmt::Display, path::Path};

use ansi_term::Colour;
use chrono::{DateTime, Utc};
use clap::ValueEnum;

use crate::{
    metrics::{ColorBucket, RankedEntry},
    utils::percentage::Percentage,
};

pub const BAR_WIDTH: usize = 20;

/// Language used for everything printed to the user.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Locale {
    En,
    Es,
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Es => write!(f, "es"),
        }
    }
}

impl Locale {
    fn chrono(self) -> chrono::Locale {
        match self {
            Locale::En => chrono::Locale::en_US,
            Locale::Es => chrono::Locale::es_ES,
        }
    }

    pub fn days(self, days: i64) -> String {
        match (self, days) {
            (Locale::En, 1) => "1 day".into(),
            (Locale::En, n) => format!("{n} days"),
            (Locale::Es, 1) => "1 día".into(),
            (Locale::Es, n) => format!("{n} días"),
        }
    }

    pub fn format_date(self, date: DateTime<Utc>) -> String {
        let format = match self {
            Locale::En => "%B %-d, %Y",
            Locale::Es => "%-d de %B de %Y",
        };
        date.format_localized(format, self.chrono()).to_string()
    }

    fn last_contact(self) -> &'static str {
        match self {
            Locale::En => "last contact",
            Locale::Es => "última vez",
        }
    }

    pub fn empty_state(self) -> &'static str {
        match self {
            Locale::En => "Nobody tracked yet. Add someone with `sincedb add <NAME>`.",
            Locale::Es => "Todavía no hay nadie. Añade a alguien con `sincedb add <NOMBRE>`.",
        }
    }

    pub fn added(self, name: &str) -> String {
        match self {
            Locale::En => format!("Added {name}"),
            Locale::Es => format!("{name} añadido correctamente"),
        }
    }

    pub fn updated(self, name: &str) -> String {
        match self {
            Locale::En => format!("Updated {name}"),
            Locale::Es => format!("{name} actualizado correctamente"),
        }
    }

    pub fn removed(self, name: &str) -> String {
        match self {
            Locale::En => format!("Removed {name}"),
            Locale::Es => format!("{name} eliminado correctamente"),
        }
    }

    pub fn touched(self, name: &str) -> String {
        match self {
            Locale::En => format!("Marked {name} as contacted today"),
            Locale::Es => format!("Marcado como hablado hoy con {name}"),
        }
    }

    pub fn cleared(self) -> &'static str {
        match self {
            Locale::En => "All data has been erased",
            Locale::Es => "Todos los datos han sido borrados",
        }
    }

    pub fn unsaved(self) -> &'static str {
        match self {
            Locale::En => "warning: changes could not be saved, see the logs",
            Locale::Es => "aviso: no se pudieron guardar los cambios, revisa los logs",
        }
    }

    pub fn info(self, location: &Path, people: usize, bytes: usize) -> String {
        match self {
            Locale::En => format!(
                "Location: {}\nPeople tracked: {people}\nData size: ~{bytes} bytes",
                location.display()
            ),
            Locale::Es => format!(
                "Ubicación: {}\nPersonas registradas: {people}\nTamaño de datos: ~{bytes} bytes",
                location.display()
            ),
        }
    }
}

fn bucket_colour(bucket: ColorBucket) -> Colour {
    match bucket {
        ColorBucket::Low => Colour::Green,
        ColorBucket::Medium => Colour::Yellow,
        ColorBucket::High => Colour::Red,
    }
}

pub fn render_bar(percentage: Percentage, bucket: ColorBucket, color: bool) -> String {
    let filled = percentage.of_width(BAR_WIDTH);
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    );
    if color {
        bucket_colour(bucket).paint(bar).to_string()
    } else {
        bar
    }
}

/// One line per person, most neglected first.
pub fn render_view(entries: &[RankedEntry<'_>], locale: Locale, color: bool) -> String {
    if entries.is_empty() {
        return format!("{}\n", locale.empty_state());
    }

    let name_width = entries
        .iter()
        .map(|e| e.person.name.chars().count())
        .max()
        .unwrap_or(0);
    let days_width = entries
        .iter()
        .map(|e| locale.days(e.days).chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for entry in entries {
        output += &format!(
            "{:<name_width$}  {}  {:<days_width$}  {}: {}\n",
            entry.person.name,
            render_bar(entry.percentage, entry.bucket, color),
            locale.days(entry.days),
            locale.last_contact(),
            locale.format_date(entry.person.last_contact),
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{render_bar, render_view, Locale, BAR_WIDTH};
    use crate::{
        metrics::{ranked_view, ColorBucket},
        store::Person,
        utils::percentage::Percentage,
    };

    #[test]
    fn pluralises_days() {
        assert_eq!(Locale::En.days(1), "1 day");
        assert_eq!(Locale::En.days(0), "0 days");
        assert_eq!(Locale::Es.days(1), "1 día");
        assert_eq!(Locale::Es.days(12), "12 días");
    }

    #[test]
    fn formats_dates_per_locale() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(Locale::En.format_date(date), "March 5, 2024");
        assert_eq!(Locale::Es.format_date(date), "5 de marzo de 2024");
    }

    #[test]
    fn bar_fills_proportionally() {
        let bar = render_bar(Percentage::MIDPOINT, ColorBucket::Low, false);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
        assert_eq!(bar.chars().count(), BAR_WIDTH);

        let coloured = render_bar(Percentage::MIDPOINT, ColorBucket::High, true);
        assert!(coloured.starts_with("\u{1b}["));
    }

    #[test]
    fn renders_ranked_lines() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let people = [
            Person {
                id: "a".into(),
                name: "Ana".into(),
                last_contact: now - Duration::days(1),
            },
            Person {
                id: "b".into(),
                name: "Benjamín".into(),
                last_contact: now - Duration::days(40),
            },
        ];
        let view = ranked_view(&people, now);
        let rendered = render_view(&view, Locale::Es, false);
        let lines = rendered.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Benjamín  "));
        assert!(lines[0].contains("40 días"));
        assert!(lines[0].contains(&"█".repeat(BAR_WIDTH)));
        assert!(lines[1].starts_with("Ana       "));
        assert!(lines[1].contains("1 día "));
        assert!(lines[1].ends_with("última vez: 14 de junio de 2024"));
    }

    #[test]
    fn renders_empty_state() {
        assert_eq!(
            render_view(&[], Locale::En, false),
            format!("{}\n", Locale::En.empty_state())
        );
    }
}
