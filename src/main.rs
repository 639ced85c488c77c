//! Command-line interface for the appointment board.
//!
//! Loads a snapshot file, lets the user narrow and order the list the way
//! the dashboard does, and checks a doctor's schedule for conflicts.

use appointdesk::board::Section;
use appointdesk::config::{self, EngineConfig};
use appointdesk::conflict::conflict_notice;
use appointdesk::{
    Appointment, AppointmentBoard, ConflictCandidate, JsonFileSource, MemorySource, PatientRecord,
    PersonSummary, SortMode, Tab,
};
use chrono::{Duration, Local};
use std::cell::Cell;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

struct BoardCLI {
    board: AppointmentBoard,
    source: Option<JsonFileSource>,
    running: bool,
    stdin_closed: Cell<bool>,
}

impl BoardCLI {
    fn new(config: EngineConfig) -> Self {
        BoardCLI {
            board: AppointmentBoard::new(config),
            source: None,
            running: true,
            stdin_closed: Cell::new(false),
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       APPOINTMENT BOARD");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Load snapshot file");
        println!("2. Refresh snapshot");
        println!("3. Select tab (all/upcoming/past)");
        println!("4. Search");
        println!("5. Filter by patient");
        println!("6. Filter by date");
        println!("7. Sort order");
        println!("8. View appointments");
        println!("9. Check doctor conflict");
        println!("10. Clear filters");
        println!("11. Run demo");
        println!("12. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).unwrap_or(0) == 0 {
            self.stdin_closed.set(true);
            return default.unwrap_or("").to_string();
        }
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i64>) -> i64 {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref());

            if let Ok(value) = input.parse::<i64>() {
                return value;
            }
            if input.is_empty() {
                return 0;
            }
            println!("Please enter a valid number");
        }
    }

    fn optional(value: String) -> Option<String> {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn load_snapshot(&mut self) {
        println!("\n--- Load Snapshot ---");
        let path = self.get_input("Snapshot file", Some("snapshot.json"));
        self.source = Some(JsonFileSource::new(path));
        self.refresh();
    }

    fn refresh(&mut self) {
        let Some(source) = self.source.as_ref() else {
            println!("\nPlease load a snapshot file first (option 1)");
            return;
        };

        let report = self.board.refresh(source);
        if let Some(count) = report.appointments_loaded {
            println!("\nLoaded {} appointments", count);
        }
        if let Some(count) = report.patients_loaded {
            println!("Loaded {} patients", count);
        }
        for failure in &report.failures {
            let kept = match failure.section {
                Section::Appointments => self.board.appointments().len(),
                Section::Patients => self.board.patients().map_or(0, <[PatientRecord]>::len),
            };
            println!(
                "Could not load {}: {} (keeping {} previous)",
                failure.section, failure.message, kept
            );
        }
    }

    fn select_tab(&mut self) {
        let current = self.board.criteria().tab.name().to_string();
        let input = self.get_input("Tab (all/upcoming/past)", Some(&current));
        match Tab::from_string(&input) {
            Ok(tab) => {
                self.board.set_tab(tab);
                println!("\nShowing {} appointments ({})", tab.name(), self.board.view().len());
            }
            Err(e) => println!("\n{}", e),
        }
    }

    fn search(&mut self) {
        let text = self.get_input("Search reference, ID or patient name (blank to clear)", None);
        self.board.set_search(Self::optional(text));
        println!("\n{} matching appointments", self.board.view().len());
    }

    fn filter_patient(&mut self) {
        let id = self.get_input("Patient ID (blank to clear)", None);
        self.board.set_patient_filter(Self::optional(id));
        println!("\n{} matching appointments", self.board.view().len());
    }

    fn filter_date(&mut self) {
        let date = self.get_input("Date YYYY-MM-DD (blank to clear)", None);
        match self.board.set_exact_date(Some(&date)) {
            Ok(()) => println!("\n{} matching appointments", self.board.view().len()),
            Err(e) => println!("\n{}", e),
        }
    }

    fn select_sort(&mut self) {
        let current = self.board.sort_mode().name().to_string();
        let input = self.get_input("Sort (date-desc/date-asc/id-desc/id-asc)", Some(&current));
        match SortMode::from_string(&input) {
            Ok(mode) => {
                self.board.set_sort_mode(mode);
                println!("\nSorted by {}", mode.name());
            }
            Err(e) => println!("\n{}", e),
        }
    }

    fn view_appointments(&self) {
        let view = self.board.view();
        if view.is_empty() {
            println!("\nNo appointments to show");
            return;
        }

        println!(
            "\n--- Appointments ({} of {}, {}, {}) ---",
            view.len(),
            self.board.appointments().len(),
            self.board.criteria().tab.name(),
            self.board.sort_mode().name()
        );

        let max_display = 25;
        for (i, apt) in view.iter().enumerate() {
            if i >= max_display {
                println!("\n... and {} more", view.len() - max_display);
                break;
            }
            println!(
                "  {:14} {:12} {:8} {:12} {}",
                self.board.reference_for(apt),
                apt.date.as_deref().map_or("-", |d| d.get(..10).unwrap_or(d)),
                apt.time.as_deref().unwrap_or("-"),
                apt.appointment_type.as_deref().unwrap_or("-"),
                self.board.patient_name(apt).unwrap_or_else(|| "Unknown patient".to_string())
            );
        }
    }

    fn check_conflict(&self) {
        println!("\n--- Check Doctor Conflict ---");
        let tomorrow = (Local::now() + Duration::days(1)).format("%Y-%m-%d").to_string();
        let date = self.get_input("Date YYYY-MM-DD", Some(&tomorrow));
        let time = self.get_input("Time HH:MM", Some("09:00"));
        let doctor = self.get_input("Doctor ID", None);
        let editing = self.get_int_input("Editing appointment ID (0 for new)", Some(0));

        let candidate = match ConflictCandidate::parse(&date, &time, doctor.as_str()) {
            Ok(candidate) => candidate,
            Err(e) => {
                println!("\n{}", e);
                return;
            }
        };
        let exclude = if editing > 0 { Some(editing) } else { None };

        match self.board.check_conflict(&candidate, exclude) {
            Some(conflict) => println!(
                "\n{} ({})",
                conflict_notice(&conflict),
                self.board.reference_for(&conflict)
            ),
            None => println!("\nNo conflicts found"),
        }
    }

    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        let today = Local::now().date_naive();
        let day = |offset: i64| (today + Duration::days(offset)).format("%Y-%m-%d").to_string();

        let appointments = vec![
            Appointment::new(1, &day(-3), "10:00")
                .with_doctor(5_i64)
                .with_patient(100_i64)
                .with_type("Checkup"),
            Appointment::new(2, &day(1), "09:00")
                .with_doctor(5_i64)
                .with_patient(101_i64)
                .with_type("Emergency"),
            Appointment::new(3, &day(1), "09:20")
                .with_doctor(5_i64)
                .with_patient(102_i64)
                .with_type("Follow-up")
                .with_reference("REF-2024-0042"),
            Appointment::new(4, &day(2), "14:00")
                .with_doctor(6_i64)
                .with_patient(100_i64)
                .with_type("Cleaning"),
        ];
        let patients = vec![
            PatientRecord::new(100_i64, PersonSummary::new("John", None, "Smith")),
            PatientRecord::new(101_i64, PersonSummary::new("Jane", Some("Marie"), "Doe")),
            PatientRecord::new(102_i64, PersonSummary::new("Bob", None, "Wilson")),
        ];

        let report = self.board.refresh(&MemorySource {
            appointments,
            patients,
        });
        println!("Loaded demo snapshot (revision {})", report.revision);

        self.board.clear_filters();
        self.board.set_sort_mode(SortMode::DateAsc);
        self.board.set_tab(Tab::Upcoming);
        println!("\nUpcoming appointments, earliest first:");
        self.view_appointments();

        let candidate = ConflictCandidate::new(&day(1), "09:25", 5_i64);
        println!("\nChecking a new booking with doctor 5 at 09:25 tomorrow...");
        match self.board.check_conflict(&candidate, None) {
            Some(conflict) => println!("  {}", conflict_notice(&conflict)),
            None => println!("  No conflicts found"),
        }

        self.board.set_tab(Tab::All);
        self.board.set_search(Some("smith".to_string()));
        println!("\nSearch 'smith' across all appointments:");
        self.view_appointments();
        self.board.set_search(None);
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(11));
            if self.stdin_closed.get() {
                break;
            }

            match choice {
                1 => self.load_snapshot(),
                2 => self.refresh(),
                3 => self.select_tab(),
                4 => self.search(),
                5 => self.filter_patient(),
                6 => self.filter_date(),
                7 => self.select_sort(),
                8 => self.view_appointments(),
                9 => self.check_conflict(),
                10 => {
                    self.board.clear_filters();
                    println!("\nFilters cleared");
                }
                11 => self.run_demo(),
                12 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut cli = BoardCLI::new(config);
    cli.run();
    ExitCode::SUCCESS
}
