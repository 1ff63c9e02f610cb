pub mod args;
pub mod card;
pub mod codec;
pub mod controller;
pub mod errors;
pub mod lineformat;
pub mod session;
pub mod store;
pub mod utils;

use std::io::stdout;

use clap::Parser;
use rand::seq::SliceRandom;

use args::{Cli, Commands};
use card::{Card, Side};
use controller::{Choice, Controller};
use errors::Result;
use lineformat::{LineFormat, Row};
use session::Session;
use store::{CardStore, OnCollision, SearchFlags};
use utils::{drop_to_editor, find_cards_folder, first_line, get_yn_input, istty,
            localize_last_touched, pretty_line, termsize, wait_for_enter, STDOUT_FILENO};

pub struct ListFlags {
    pub condensed: bool,
    pub datesort: bool,
    pub reverse: bool,
    pub yaml: bool,
}

impl Default for ListFlags {
    fn default() -> Self {
        ListFlags {
            condensed: false,
            datesort: false,
            reverse: false,
            yaml: false,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

pub fn r#run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let folder = find_cards_folder(&cli.folder)?;
    log::debug!("cards folder: {}", folder.display());
    let store = CardStore::open(&folder)?;
    let controller = Controller::new(&store);

    match &cli.command {
        Some(Commands::List { limit, datesort, reverse, yaml, condensed }) => {
            let flags = ListFlags {
                condensed: *condensed,
                datesort: *datesort,
                reverse: *reverse,
                yaml: *yaml,
            };
            list_cards(&store, controller.list()?, limit.unwrap_or(0), flags)?;
        }
        Some(Commands::Show { name, yaml }) => {
            let card = open_named(&controller, name)?;
            show_card(&card, *yaml)?;
        }
        Some(Commands::New { name, question, answer, editor, no_clobber }) => {
            utils::check_card_name(name)?;
            let mut card = controller.new_card();
            card.question = question.clone();
            card.answer = answer.clone();
            if *editor {
                card = edit_in_editor(&card)?;
            }
            let on_collision = if *no_clobber { OnCollision::Fail } else { OnCollision::Overwrite };
            if let Some(saved) = controller.save(&card, Choice::Approved(store.folder().join(name)), on_collision)? {
                println!("card {} saved", saved);
            }
        }
        Some(Commands::Edit { name, question, answer, editor }) => {
            let mut card = open_named(&controller, name)?;
            if let Some(q) = question {
                card.question = q.clone();
            }
            if let Some(a) = answer {
                card.answer = a.clone();
            }
            if *editor {
                let location = card.location.clone();
                card = edit_in_editor(&card)?;
                card.location = location;
            }
            let target = match card.location.clone() {
                Some(l) => l,
                None => store.path_for(name),
            };
            if let Some(saved) = controller.save(&card, Choice::Approved(target), OnCollision::Overwrite)? {
                println!("edited card {}", saved);
            }
        }
        Some(Commands::Delete { names }) => {
            for name in names.iter() {
                let card = Card::default().with_location(&store.path_for(name));
                if !cli.yes {
                    let message = format!("delete card {}?\n", card);
                    if !get_yn_input(&message)? {
                        continue;
                    }
                }
                match controller.delete(&card) {
                    Ok(()) => println!("deleted card {}", card),
                    Err(ref e) if e.is_not_found() => println!("card {} doesn't exist", card),
                    Err(e) => return Err(e),
                }
            }
        }
        Some(Commands::Rename { name, new_name, no_clobber }) => {
            let card = open_named(&controller, name)?;
            let on_collision = if *no_clobber { OnCollision::Fail } else { OnCollision::Overwrite };
            let renamed = controller.rename(&card, new_name, on_collision)?;
            println!("renamed card {} to {}", card, renamed);
        }
        Some(Commands::Play { names, shuffle }) => {
            let mut cards = if names.is_empty() {
                let mut cards = controller.list()?;
                cards.sort_by_key(|c| c.name());
                cards
            } else {
                names.iter()
                     .map(|n| open_named(&controller, n))
                     .collect::<Result<Vec<Card>>>()?
            };
            if *shuffle {
                cards.shuffle(&mut rand::thread_rng());
            }
            play(cards)?;
        }
        Some(Commands::Search { pattern, answer, regex }) => {
            let flags = SearchFlags {
                regex: *regex,
                search_answer: *answer,
            };
            let found = store.search(pattern, flags)?;
            if found.is_empty() {
                println!("nothing found");
            } else {
                list_cards(&store, found, 0, ListFlags::default())?;
            }
        }
        Some(Commands::Info) => {
            info(&store)?;
        }
        None => {
            list_cards(&store, controller.list()?, 0, ListFlags::default())?;
        }
    }

    Ok(())
}

fn open_named(controller: &Controller, name: &str) -> Result<Card> {
    let path = controller.store().path_for(name);
    match controller.open(Choice::Approved(path))? {
        Some(card) => Ok(card),
        None => crate::specific_fail!(format!("card {} doesn't exist", name)),
    }
}

/// Round trip a card through $EDITOR in its on-disk text form.
fn edit_in_editor(card: &Card) -> Result<Card> {
    let edited = drop_to_editor(&codec::encode_to_string(card)?)?;
    codec::decode_str(&edited)?.into_card(None)
}

fn show_card(card: &Card, yaml: bool) -> Result<()> {
    if yaml {
        print!("{}", serde_yaml::to_string(card)?);
        return Ok(());
    }
    let tty = istty(STDOUT_FILENO);
    pretty_line("name\n----\n", &format!("{}\n\n", card), tty)?;
    pretty_line("question\n--------\n", &format!("{}\n\n", card.question), tty)?;
    pretty_line("answer\n------\n", &format!("{}\n", card.answer), tty)?;
    for (key, value) in card.properties.iter() {
        pretty_line(&format!("\n{}: ", key), value, tty)?;
    }
    if !card.properties.is_empty() {
        println!();
    }
    Ok(())
}

pub fn list_cards(store: &CardStore, mut cards: Vec<Card>, limit: usize, flags: ListFlags) -> Result<()> {
    if cards.is_empty() {
        if flags.yaml {
            println!("[]");
        } else {
            println!("no cards in {}", store.folder().display());
        }
        return Ok(());
    }

    if flags.datesort {
        cards.sort_by_key(|c| store.last_touched(c).ok());
    } else {
        cards.sort_by_key(|c| c.name());
    }
    if flags.reverse {
        cards.reverse();
    }
    let limit = if limit != 0 && limit < cards.len() {
        limit
    } else {
        cards.len()
    };
    let cards = &cards[..limit];

    if flags.yaml {
        print!("{}", serde_yaml::to_string(cards)?);
        return Ok(());
    }

    let rows: Vec<Row> = cards.iter()
        .map(|c| Row {
            name: c.to_string(),
            question: first_line(&c.question).to_string(),
            touched: store.last_touched(c)
                          .map(|t| localize_last_touched(&t))
                          .unwrap_or_default(),
        })
        .collect();
    let line_format = LineFormat::new(&rows, flags.condensed, termsize());
    if !flags.condensed {
        let header = Row {
            name: "name".to_string(),
            question: "question".to_string(),
            touched: "last touched".to_string(),
        };
        let tty = istty(STDOUT_FILENO);
        let mut out = Vec::new();
        header.write(&mut out, &line_format)?;
        pretty_line(&String::from_utf8_lossy(&out), "", tty)?;
        println!("{}", "-".repeat(line_format.line_width()));
    }
    let mut out = stdout();
    for row in rows.iter() {
        row.write(&mut out, &line_format)?;
    }
    Ok(())
}

/// Player mode: question first, enter flips, enter again moves on.
pub fn play(cards: Vec<Card>) -> Result<()> {
    if cards.is_empty() {
        println!("no cards to play");
        return Ok(());
    }
    let tty = istty(STDOUT_FILENO);
    let total = cards.len();
    for (i, card) in cards.into_iter().enumerate() {
        let mut session = Session::player(card);
        pretty_line(&format!("[{}/{}] {}\n", i + 1, total, session.card), "", tty)?;
        for (side, text) in session.visible() {
            pretty_line(&format!("{}: ", side), &format!("{}\n", text), tty)?;
        }
        if !wait_for_enter("(enter flips) ")? {
            return Ok(());
        }
        if session.flip() == Side::Answer {
            for (side, text) in session.visible() {
                pretty_line(&format!("{}: ", side), &format!("{}\n", text), tty)?;
            }
        }
        if i + 1 < total && !wait_for_enter("(enter for next, q quits) ")? {
            return Ok(());
        }
        println!();
    }
    Ok(())
}

fn info(store: &CardStore) -> Result<()> {
    let tty = istty(STDOUT_FILENO);
    let scanned = store.scan()?;
    let broken = scanned.iter().filter(|(_, c)| c.is_err()).count();
    let cards: Vec<Card> = scanned.into_iter().filter_map(|(_, c)| c.ok()).collect();

    pretty_line("folder: ", &format!("{}\n", store.folder().display()), tty)?;
    pretty_line("cards: ", &format!("{}\n", cards.len()), tty)?;
    if broken > 0 {
        pretty_line("unreadable: ", &format!("{}\n", broken), tty)?;
    }
    let mut touched: Vec<(chrono::DateTime<chrono::Local>, String)> = cards.iter()
        .filter_map(|c| store.last_touched(c).ok().map(|t| (t, c.to_string())))
        .collect();
    touched.sort();
    if let (Some(oldest), Some(newest)) = (touched.first(), touched.last()) {
        pretty_line("card ages: ",
                    &format!("oldest: {} ({}), newest: {} ({})\n",
                             oldest.1,
                             localize_last_touched(&oldest.0),
                             newest.1,
                             localize_last_touched(&newest.0)),
                    tty)?;
    }
    Ok(())
}
