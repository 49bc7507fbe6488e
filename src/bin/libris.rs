//! libris console front-end
//!
//! A numbered-menu interface over the three library stores. All
//! validation lives in the stores; this layer only prompts, parses, maps
//! the keep-current sentinels (empty input, -1) onto `None`, and prints
//! whatever the stores return.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use libris::{
    Book, BookUpdate, BorrowRecord, BorrowStatus, Library, StoreError, UserUpdate,
};

/// Command-line configuration.
struct Config {
    /// Directory holding the three data files.
    data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    config.data_dir = PathBuf::from(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("error: --data-dir requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("libris - library management console");
                println!();
                println!("USAGE:");
                println!("    libris [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -d, --data-dir <DIR>      Data directory [default: ./data]");
                println!("    -h, --help                Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

fn main() {
    env_logger::init();
    let config = parse_args();

    let (mut library, report) = Library::open(&config.data_dir);
    if report.total_skipped() > 0 {
        println!(
            "Warning: {} line(s) could not be loaded:",
            report.total_skipped()
        );
        for diag in report
            .books
            .iter()
            .chain(&report.users)
            .chain(&report.records)
        {
            println!("  {diag}");
        }
    }
    println!(
        "Loaded {} book(s), {} user(s), {} borrow record(s) from {}",
        library.books.len(),
        library.users.len(),
        library.records.len(),
        config.data_dir.display()
    );

    main_menu(&mut library);

    println!("Saving data...");
    report_save(&library);
    println!("Data saved, goodbye!");
}

fn main_menu(library: &mut Library) {
    loop {
        println!();
        println!("===== Library Management System =====");
        println!("1. Book management");
        println!("2. User management");
        println!("3. Borrow record management");
        println!("4. Save all data");
        println!("0. Exit");

        match prompt("Select a function: ").as_deref() {
            Some("1") => book_menu(library),
            Some("2") => user_menu(library),
            Some("3") => borrow_menu(library),
            Some("4") => report_save(library),
            Some("0") | None => return,
            Some(_) => println!("Invalid function number, please re-enter!"),
        }
    }
}

fn report_save(library: &Library) {
    let failures = library.save_all();
    if failures.is_empty() {
        println!("All data saved successfully!");
    } else {
        for (kind, err) in failures {
            println!("Error saving {kind}: {err}");
        }
    }
}

fn book_menu(library: &mut Library) {
    loop {
        println!();
        println!("----- Book Management -----");
        println!("1. Add book");
        println!("2. Delete book");
        println!("3. Update book");
        println!("4. List all books");
        println!("5. Search by ISBN");
        println!("6. Search by title");
        println!("7. Search by author");
        println!("0. Back");

        match prompt("Select an operation: ").as_deref() {
            Some("1") => add_book(library),
            Some("2") => {
                let Some(isbn) = prompt("ISBN to delete: ") else { return };
                report(library.books.delete_by_key(&isbn), "Book deleted.");
            }
            Some("3") => update_book(library),
            Some("4") => list_books(library),
            Some("5") => {
                let Some(isbn) = prompt("ISBN to search: ") else { return };
                match library.books.find_by_key(&isbn) {
                    Some(book) => print_book(1, book),
                    None => println!("No book found with ISBN [{}]!", isbn.trim()),
                }
            }
            Some("6") => search_books_by_title(library),
            Some("7") => search_books_by_author(library),
            Some("0") | None => return,
            Some(_) => println!("Invalid operation number, please re-enter!"),
        }
    }
}

fn add_book(library: &mut Library) {
    let Some(title) = prompt("Title: ") else { return };
    let Some(author) = prompt("Author: ") else { return };
    let Some(isbn) = prompt("ISBN: ") else { return };
    let Some(total) = prompt_u32("Total quantity: ") else { return };
    let Some(borrowed) = prompt_u32("Borrowed quantity: ") else { return };

    report(
        library.books.add(Book::new(title, author, isbn, total, borrowed)),
        "Book added.",
    );
}

fn update_book(library: &mut Library) {
    let Some(isbn) = prompt("ISBN to update: ") else { return };
    println!("Leave text empty or enter -1 for a quantity to keep the current value.");
    let Some(title) = prompt("New title: ") else { return };
    let Some(author) = prompt("New author: ") else { return };
    let Some(total) = prompt_quantity_or_keep("New total quantity (-1 to keep): ") else {
        return;
    };
    let Some(borrowed) = prompt_quantity_or_keep("New borrowed quantity (-1 to keep): ") else {
        return;
    };

    let update = BookUpdate {
        title: keep_if_empty(title),
        author: keep_if_empty(author),
        total,
        borrowed,
    };
    report(library.books.update_book(&isbn, update), "Book updated.");
}

fn list_books(library: &Library) {
    if library.books.is_empty() {
        println!("No books to show!");
        return;
    }
    println!();
    println!("===== All Books =====");
    for (i, book) in library.books.records().iter().enumerate() {
        print_book(i + 1, book);
    }
}

fn print_book(number: usize, book: &Book) {
    println!(
        "{number}. ISBN: {} | Title: {} | Author: {} | Total: {} | Borrowed: {} | Remaining: {}",
        book.isbn,
        book.title,
        book.author,
        book.total,
        book.borrowed,
        book.remaining()
    );
}

fn search_books_by_title(library: &Library) {
    let Some(keyword) = prompt("Title keyword: ") else { return };
    match library.books.search_by_title(&keyword) {
        Ok(result) if result.matches.is_empty() => {
            println!("No books found containing [{}]!", keyword.trim());
        }
        Ok(result) => {
            println!("Found {} matching book(s):", result.matches.len());
            for (i, book) in result.matches.iter().enumerate() {
                print_book(i + 1, book);
            }
            println!(
                "Total quantity of matches: {} | Total borrowed: {}",
                result.total_quantity, result.total_borrowed
            );
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn search_books_by_author(library: &Library) {
    let Some(author) = prompt("Author name: ") else { return };
    match library.books.search_by_author(&author) {
        Ok(matches) if matches.is_empty() => {
            println!("No books found by author [{}]!", author.trim());
        }
        Ok(matches) => {
            println!("Found {} book(s) by this author:", matches.len());
            for (i, book) in matches.iter().enumerate() {
                print_book(i + 1, book);
            }
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn user_menu(library: &mut Library) {
    loop {
        println!();
        println!("----- User Management -----");
        println!("1. Add user");
        println!("2. Delete user");
        println!("3. Update user");
        println!("4. List all users");
        println!("5. Search by user ID");
        println!("6. Search by name");
        println!("0. Back");

        match prompt("Select an operation: ").as_deref() {
            Some("1") => add_user(library),
            Some("2") => {
                let Some(id) = prompt("User ID to delete: ") else { return };
                report(library.users.delete_by_key(&id), "User deleted.");
            }
            Some("3") => update_user(library),
            Some("4") => list_users(library),
            Some("5") => {
                let Some(id) = prompt("User ID to search: ") else { return };
                match library.users.find_by_key(&id) {
                    Some(user) => print_user(1, user),
                    None => println!("No user found with ID [{}]!", id.trim()),
                }
            }
            Some("6") => search_users_by_name(library),
            Some("0") | None => return,
            Some(_) => println!("Invalid operation number, please re-enter!"),
        }
    }
}

fn add_user(library: &mut Library) {
    let Some(name) = prompt("Name: ") else { return };
    let Some(id) = prompt("User ID: ") else { return };
    let Some(password) = prompt("Password: ") else { return };

    report(
        library.users.add(libris::User::new(name, id, password)),
        "User added.",
    );
}

fn update_user(library: &mut Library) {
    let Some(id) = prompt("User ID to update: ") else { return };
    println!("Leave a field empty to keep the current value.");
    let Some(name) = prompt("New name: ") else { return };
    let Some(password) = prompt("New password: ") else { return };

    let update = UserUpdate {
        name: keep_if_empty(name),
        password: keep_if_empty(password),
    };
    report(library.users.update_user(&id, update), "User updated.");
}

fn list_users(library: &Library) {
    if library.users.is_empty() {
        println!("No users to show!");
        return;
    }
    println!();
    println!("===== All Users =====");
    for (i, user) in library.users.records().iter().enumerate() {
        print_user(i + 1, user);
    }
}

fn print_user(number: usize, user: &libris::User) {
    // Passwords are shown in clear text, matching the source system.
    println!(
        "{number}. ID: {} | Name: {} | Password: {}",
        user.user_id, user.name, user.password
    );
}

fn search_users_by_name(library: &Library) {
    let Some(keyword) = prompt("Name keyword: ") else { return };
    match library.users.search_by_name(&keyword) {
        Ok(matches) if matches.is_empty() => {
            println!("No users found containing [{}]!", keyword.trim());
        }
        Ok(matches) => {
            println!("Found {} matching user(s):", matches.len());
            for (i, user) in matches.iter().enumerate() {
                print_user(i + 1, user);
            }
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn borrow_menu(library: &mut Library) {
    loop {
        println!();
        println!("----- Borrow Record Management -----");
        println!("1. Add borrow record");
        println!("2. Delete borrow record");
        println!("3. Update record status");
        println!("4. List all records");
        println!("5. Search by record ID");
        println!("6. Search by status");
        println!("0. Back");

        match prompt("Select an operation: ").as_deref() {
            Some("1") => add_borrow_record(library),
            Some("2") => {
                let Some(id) = prompt("Record ID to delete: ") else { return };
                report(library.records.delete_by_key(&id), "Record deleted.");
            }
            Some("3") => update_borrow_status(library),
            Some("4") => list_records(library),
            Some("5") => {
                let Some(id) = prompt("Record ID to search: ") else { return };
                match library.records.find_by_key(&id) {
                    Some(record) => print_record(1, record),
                    None => println!("No borrow record found with ID [{}]!", id.trim()),
                }
            }
            Some("6") => search_records_by_status(library),
            Some("0") | None => return,
            Some(_) => println!("Invalid operation number, please re-enter!"),
        }
    }
}

fn add_borrow_record(library: &mut Library) {
    let Some(id) = prompt("Record ID: ") else { return };
    let Some(date_input) = prompt("Borrow date (empty for today): ") else { return };
    let date = if date_input.trim().is_empty() {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    } else {
        date_input
    };
    let Some(status) = prompt_status() else { return };

    report(
        library.records.add(BorrowRecord::new(id, date, status)),
        "Borrow record added.",
    );
}

fn update_borrow_status(library: &mut Library) {
    let Some(id) = prompt("Record ID to update: ") else { return };
    let Some(status) = prompt_status() else { return };
    match library.records.set_status(&id, status) {
        Ok(()) => println!("Status updated to: {status}"),
        Err(err) => println!("Error: {err}"),
    }
}

fn list_records(library: &Library) {
    if library.records.is_empty() {
        println!("No borrow records to show!");
        return;
    }
    println!();
    println!("===== All Borrow Records =====");
    for (i, record) in library.records.records().iter().enumerate() {
        print_record(i + 1, record);
    }
}

fn print_record(number: usize, record: &BorrowRecord) {
    println!(
        "{number}. Record ID: {} | Borrow date: {} | Status: {}",
        record.record_id, record.date, record.status
    );
}

fn search_records_by_status(library: &Library) {
    let Some(status) = prompt_status() else { return };
    let matches = library.records.find_by_status(status);
    if matches.is_empty() {
        println!("No borrow records found with status [{status}]!");
        return;
    }
    println!("Found {} record(s):", matches.len());
    for (i, record) in matches.iter().enumerate() {
        print_record(i + 1, record);
    }
}

/// Prints the result of a mutating store call.
fn report(result: Result<(), StoreError>, success: &str) {
    match result {
        Ok(()) => println!("{success}"),
        Err(err) => println!("Error: {err}"),
    }
}

/// `None` for an all-whitespace answer, keeping the current value.
fn keep_if_empty(input: String) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

/// Reads one line after printing the prompt. `None` means stdin closed.
fn prompt(message: &str) -> Option<String> {
    print!("{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Prompts until a non-negative integer is entered.
fn prompt_u32(message: &str) -> Option<u32> {
    loop {
        let input = prompt(message)?;
        match input.trim().parse::<u32>() {
            Ok(value) => return Some(value),
            Err(_) => println!("Input error, please enter a valid non-negative number!"),
        }
    }
}

/// Prompts for a quantity where `-1` means "keep the current value".
fn prompt_quantity_or_keep(message: &str) -> Option<Option<u32>> {
    loop {
        let input = prompt(message)?;
        let input = input.trim();
        if input.is_empty() || input == "-1" {
            return Some(None);
        }
        match input.parse::<u32>() {
            Ok(value) => return Some(Some(value)),
            Err(_) => println!("Input error, please enter a valid number or -1 to keep!"),
        }
    }
}

/// Prompts until a valid status code (0 or 1) is entered.
fn prompt_status() -> Option<BorrowStatus> {
    loop {
        let input = prompt("Status (0 = checked out, 1 = returned): ")?;
        match input.trim().parse::<i64>() {
            Ok(code) => match BorrowStatus::from_code(code) {
                Ok(status) => return Some(status),
                Err(err) => println!("Error: {err}"),
            },
            Err(_) => println!("Input error, please enter 0 or 1!"),
        }
    }
}
