use migration::Migrator;
use std::{fs, path::Path, process};
use util::{config, paths};

mod runner;

#[tokio::main]
async fn main() {
    let db_path = config::database_path();
    let url = paths::database_url(&db_path);
    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
            Ok(())
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await
        }
        _ => {
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await
        }
    };

    if let Err(err) = result {
        eprintln!("Migration failed: {err}");
        process::exit(1);
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if !db_path.exists() {
        println!("DB file does not exist: {}", db_path.display());
        return;
    }
    match fs::remove_file(db_path) {
        Ok(()) => println!("Deleted DB: {}", db_path.display()),
        Err(err) => {
            eprintln!("Failed to delete DB {}: {err}", db_path.display());
            process::exit(1);
        }
    }
}

fn create_db_dir(path: &str) {
    if let Err(err) = paths::ensure_parent_dir(path) {
        eprintln!("Failed to create DB directory for {path}: {err}");
        process::exit(1);
    }
}
