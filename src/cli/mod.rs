pub mod dates;
pub mod render;

use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use dates::{parse_user_date, today, DateStyle};
use render::{render_view, Locale};
use tracing::level_filters::LevelFilter;

use crate::{
    metrics::ranked_view,
    storage::{FileStorage, KeyValueStorage},
    store::{PersonId, Store, StoreError, PEOPLE_KEY},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "sincedb", version, long_about = None)]
#[command(about = "Keeps track of how long it has been since you last talked to people", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(long, global = true, default_value_t = Locale::En, help = "Language of the output")]
    locale: Locale,
    #[arg(
        long,
        global = true,
        default_value_t = DateStyle::Uk,
        help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year"
    )]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Start tracking a person")]
    Add {
        name: String,
        #[arg(
            long,
            short,
            help = "Day of the last contact. Examples are \"2025-03-15\", \"yesterday\", \"last friday\", \"15/03/2025\". Defaults to today"
        )]
        date: Option<String>,
    },
    #[command(about = "Change the name or last contact date of a person")]
    Edit {
        #[arg(help = "Id or name of the person")]
        person: String,
        #[arg(long, short, help = "New name")]
        name: Option<String>,
        #[arg(long, short, help = "New day of the last contact")]
        date: Option<String>,
    },
    #[command(about = "Stop tracking a person")]
    Remove {
        #[arg(help = "Id or name of the person")]
        person: String,
    },
    #[command(about = "Mark a person as contacted just now")]
    Touch {
        #[arg(help = "Id or name of the person")]
        person: String,
    },
    #[command(about = "Show everyone, longest without contact first")]
    List {},
    #[command(about = "Erase every tracked person")]
    Clear {
        #[arg(long, help = "Confirm that everything should be erased. This can't be undone")]
        yes: bool,
    },
    #[command(about = "Show where and how much data is stored")]
    Info {},
}

/// How results are presented. Kept apart from [Args] so commands can be run against any store.
#[derive(Debug, Clone, Copy)]
struct Presentation {
    locale: Locale,
    date_style: DateStyle,
    color: bool,
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir.join("logs"), logging_level, args.log)?;

    let storage = FileStorage::new(app_dir.join("data"))?;
    let location = storage.path_for(PEOPLE_KEY);
    let mut store = Store::open(storage, Box::new(DefaultClock));

    let presentation = Presentation {
        locale: args.locale,
        date_style: args.date_style,
        color: std::io::stdout().is_terminal(),
    };
    let mut stdout = std::io::stdout().lock();
    execute(
        args.commands,
        &mut store,
        &location,
        Utc::now(),
        presentation,
        &mut stdout,
    )
}

fn execute<S: KeyValueStorage>(
    command: Commands,
    store: &mut Store<S>,
    location: &std::path::Path,
    now: DateTime<Utc>,
    Presentation {
        locale,
        date_style,
        color,
    }: Presentation,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Add { name, date } => {
            let date = match date {
                Some(v) => parse_user_date(&v, now, date_style)?,
                None => today(now),
            };
            let added = store.add(&name, date)?;
            writeln!(out, "{}", locale.added(&added.name))?;
        }
        Commands::Edit { person, name, date } => {
            let current = resolve(store, &person)?;
            let id = current.id.clone();
            let name = name.unwrap_or_else(|| current.name.clone());
            let date = match date {
                Some(v) => parse_user_date(&v, now, date_style)?,
                None => current.last_contact,
            };
            let edited = store.edit(&id, &name, date)?;
            writeln!(out, "{}", locale.updated(&edited.name))?;
        }
        Commands::Remove { person } => {
            let id = resolve(store, &person)?.id.clone();
            let removed = store.remove(&id)?;
            writeln!(out, "{}", locale.removed(&removed.name))?;
        }
        Commands::Touch { person } => {
            let id = resolve(store, &person)?.id.clone();
            let touched = store.touch(&id)?;
            writeln!(out, "{}", locale.touched(&touched.name))?;
        }
        Commands::List {} => {
            let view = ranked_view(store.people(), now);
            write!(out, "{}", render_view(&view, locale, color))?;
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "Clearing erases every tracked person permanently. Pass --yes to confirm",
                    )
                    .into());
            }
            store.clear();
            writeln!(out, "{}", locale.cleared())?;
        }
        Commands::Info {} => {
            writeln!(
                out,
                "{}",
                locale.info(location, store.len(), store.storage_size())
            )?;
        }
    }

    if store.has_unsaved_changes() {
        writeln!(out, "{}", locale.unsaved())?;
    }
    Ok(())
}

fn resolve<'a, S: KeyValueStorage>(
    store: &'a Store<S>,
    query: &str,
) -> Result<&'a crate::store::Person, StoreError> {
    store
        .find(query)
        .ok_or_else(|| StoreError::NotFound(PersonId::from(query)))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::{anyhow, Result};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{execute, render::Locale, Commands, DateStyle, Presentation};
    use crate::{
        metrics::ranked_view,
        storage::{MemoryStorage, MockKeyValueStorage},
        store::{Store, StoreError},
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    const PRESENTATION: Presentation = Presentation {
        locale: Locale::En,
        date_style: DateStyle::Uk,
        color: false,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn run<S: crate::storage::KeyValueStorage>(
        store: &mut Store<S>,
        command: Commands,
    ) -> Result<String> {
        run_at(store, command, now())
    }

    fn run_at<S: crate::storage::KeyValueStorage>(
        store: &mut Store<S>,
        command: Commands,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let mut out = Vec::new();
        execute(
            command,
            store,
            Path::new("/tmp/sincedb-people.json"),
            now,
            PRESENTATION,
            &mut out,
        )?;
        Ok(String::from_utf8(out)?)
    }

    fn store(storage: &MemoryStorage) -> Store<&MemoryStorage> {
        *TEST_LOGGING;
        Store::open(storage, Box::new(FixedClock(now())))
    }

    #[test]
    fn test_add_then_list() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);

        let output = run(
            &mut store,
            Commands::Add {
                name: "Ana".into(),
                date: Some("2024-06-05".into()),
            },
        )?;
        assert_eq!(output, "Added Ana\n");
        run(
            &mut store,
            Commands::Add {
                name: "Ben".into(),
                date: Some("2024-05-06".into()),
            },
        )?;

        let listed = run(&mut store, Commands::List {})?;
        let lines = listed.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Ben"));
        assert!(lines[0].contains("40 days"));
        assert!(lines[1].starts_with("Ana"));
        assert!(lines[1].contains("10 days"));
        Ok(())
    }

    #[test]
    fn test_add_duplicate_is_refused() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        run(
            &mut store,
            Commands::Add {
                name: "Ana".into(),
                date: None,
            },
        )?;

        let err = run(
            &mut store,
            Commands::Add {
                name: "ana".into(),
                date: None,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::DuplicateName(_))
        ));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_edit_by_name_keeps_missing_fields() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        let date = now() - Duration::days(3);
        let id = store.add("Ana", date)?.id.clone();

        let output = run(
            &mut store,
            Commands::Edit {
                person: "ANA".into(),
                name: Some("Ana María".into()),
                date: None,
            },
        )?;
        assert_eq!(output, "Updated Ana María\n");

        let person = store.get(&id).ok_or_else(|| anyhow!("edited person vanished"))?;
        assert_eq!(person.name, "Ana María");
        assert_eq!(person.last_contact, date);
        Ok(())
    }

    #[test]
    fn test_touch_and_remove_by_id() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        let id = store.add("Ana", now() - Duration::days(20))?.id.clone();

        run(
            &mut store,
            Commands::Touch {
                person: id.to_string(),
            },
        )?;
        assert_eq!(store.get(&id).map(|p| p.last_contact), Some(now()));

        let output = run(
            &mut store,
            Commands::Remove {
                person: id.to_string(),
            },
        )?;
        assert_eq!(output, "Removed Ana\n");
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_person_is_not_found() {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        let err = run(
            &mut store,
            Commands::Touch {
                person: "nobody".into(),
            },
        )
        .unwrap_err();
        assert!(err
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_not_found));
    }

    #[test]
    fn test_unknown_name_is_reported_as_name_or_id() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        store.add("Ana", now())?;

        let err = run(
            &mut store,
            Commands::Remove {
                person: "Bob".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "no person with id or name \"Bob\"");
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_added_today_is_zero_days_east_of_utc() -> Result<()> {
        std::env::set_var("TZ", "Asia/Tokyo");
        // 05:00 on the 15th in Tokyo, still the 14th in UTC.
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 20, 0, 0).unwrap();
        let storage = MemoryStorage::new();
        let mut store = Store::open(&storage, Box::new(FixedClock(now)));

        run_at(
            &mut store,
            Commands::Add {
                name: "Ana".into(),
                date: None,
            },
            now,
        )?;
        run_at(
            &mut store,
            Commands::Add {
                name: "Ben".into(),
                date: Some("yesterday".into()),
            },
            now,
        )?;

        let days = ranked_view(store.people(), now)
            .iter()
            .map(|e| (e.person.name.as_str(), e.days))
            .collect::<Vec<_>>();
        assert_eq!(days, vec![("Ben", 1), ("Ana", 0)]);

        let listed = run_at(&mut store, Commands::List {}, now)?;
        assert!(listed.lines().nth(1).is_some_and(|l| l.contains("0 days")));
        Ok(())
    }

    #[test]
    fn test_clear_requires_confirmation() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        store.add("Ana", now())?;

        assert!(run(&mut store, Commands::Clear { yes: false }).is_err());
        assert_eq!(store.len(), 1);

        run(&mut store, Commands::Clear { yes: true })?;
        assert!(store.is_empty());
        assert!(!storage.contains_key(crate::store::PEOPLE_KEY));
        Ok(())
    }

    #[test]
    fn test_info_reports_size() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        store.add("Ana", now())?;
        let size = store.storage_size();
        assert!(size > 0);

        let output = run(&mut store, Commands::Info {})?;
        assert!(output.contains("People tracked: 1"));
        assert!(output.contains(&format!("~{size} bytes")));
        Ok(())
    }

    #[test]
    fn test_failed_save_is_reported() -> Result<()> {
        *TEST_LOGGING;
        let mut storage = MockKeyValueStorage::new();
        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .returning(|_, _| Err(anyhow!("read-only filesystem")));
        let mut store = Store::open(storage, Box::new(FixedClock(now())));

        let output = run(
            &mut store,
            Commands::Add {
                name: "Ana".into(),
                date: None,
            },
        )?;
        assert_eq!(output, format!("Added Ana\n{}\n", Locale::En.unsaved()));
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
