use chrono::{Local, Utc};
use droword::{
    Config, JsonStore, PracticeSession, Rating, WordContent, WordRecord, WordStore,
    adapt_example,
};

fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging()?;

    let config = Config::default();
    let scheduler = config.scheduler()?;

    let path = std::env::temp_dir().join("droword-demo.json");
    let mut store = JsonStore::open(&path)?;
    if store.words().is_empty() {
        for (word, translation, example) in [
            ("casa", "house", "Mi casa es tu casa; siempre."),
            ("perro", "dog", "El perro duerme en el sofá."),
            ("libro", "book", "Leo un libro cada semana."),
        ] {
            store.add(WordRecord::new(
                WordContent::new(word, "noun", "Español", "English")
                    .with_translation(translation)
                    .with_example(example),
                Utc::now(),
            ))?;
        }
    }

    let mut session =
        PracticeSession::start(&scheduler, config.proficiency.clone(), &mut store, &Local::now())?;

    // Fail the first card once, pass everything else
    let mut failed_once = false;
    while let Some(word) = session.current() {
        let level = session.proficiency().level();
        let example = word.content.example.as_deref().unwrap_or_default();
        println!(
            "{} ({}): {}",
            word.content.word,
            word.content.translation.as_deref().unwrap_or("?"),
            adapt_example(example, &word.content.from_language, level)
        );

        let preview = scheduler.next_states(&word.scheduling, Utc::now());
        println!(
            "  again: 10 min, hard: {} d, good: {} d, easy: {} d",
            preview.hard.interval_days, preview.good.interval_days, preview.easy.interval_days
        );

        let rating = if failed_once { Rating::Good } else { Rating::Again };
        failed_once = true;
        let review = session.rate(rating, Utc::now())?;
        let due = review.updated.due_date.unwrap_or_else(Utc::now) - Utc::now();
        println!(
            "  {rating}: next review in {} min, level {} ({:.3})",
            due.num_minutes().max(0),
            review.proficiency.level(),
            review.proficiency.score()
        );
    }

    println!("Session complete, state saved to {}", path.display());
    Ok(())
}
