//! The interactive menu tree.
//!
//! ```text
//! Main Menu
//! ├── 1  Login/Signup
//! │      ├── Hospital Staff Login  -> Hospital Staff Menu (provider-scoped)
//! │      ├── Patient Portal Login  -> Patient Portal (access code asked once)
//! │      ├── Create Staff Profile
//! │      ├── Create Patient Account
//! │      └── List Hospital Staff
//! ├── 2-9 information pages
//! ├── 10 Health Education Resources (browse and search)
//! └── 11 Exit (saves)
//! ```
//!
//! Input comes from a [`Prompter`] and output goes to any [`Write`] sink, so the whole tree
//! can be driven by a script in tests. When the prompter reports closed input every menu
//! unwinds and the registry is saved.

use crate::pages::{self, InfoPage};
use crate::prompt::Prompter;
use medilink_core::appointments::parse_appointment_date;
use medilink_core::export::export_to_path;
use medilink_core::reminders::deliver_appointment_reminder;
use medilink_core::{
    AccessCode, Accessor, CoreConfig, DataStore, EmailAddress, MediLinkError, MediLinkResult,
    MedicalRecordEntry, NewPatient, NonEmptyText, OutboxSender, Patient, ReminderOutcome,
    ReminderSender, SharedRegistry,
};
use std::io::{self, Write};

const MAIN_MENU: &[&str] = &[
    "Login/Signup",
    "Emergency Services Information",
    "Find Nearest Healthcare Facilities",
    "COVID-19 Information and Updates",
    "General Health Tips",
    "Vaccination Information",
    "Mental Health Resources",
    "First Aid Guidelines",
    "Contact Us",
    "Health Education Resources",
    "Exit",
];

const LOGIN_MENU: &[&str] = &[
    "Hospital Staff Login",
    "Patient Portal Login",
    "Create Staff Profile",
    "Create Patient Account",
    "List Hospital Staff",
    "Return to Main Menu",
];

const STAFF_MENU: &[&str] = &[
    "Access Patient Medical Records",
    "Register a New Patient",
    "Add Medical Record Entry",
    "Update Existing Medical Record",
    "Print Medical Records",
    "List Access Codes",
    "Check Appointment Reminders",
    "Schedule Appointment",
    "Reschedule Appointment",
    "Cancel Appointment",
    "Generate Patient Report",
    "View Current Inventory",
    "Update Inventory",
    "View Bed Occupancy",
    "Update Bed Availability",
    "Add Medication Reminder for Patient",
    "Update Medication Reminder for Patient",
    "Request Medication Refill for Patient",
    "Contact Healthcare Provider",
    "View Health Education Resources",
    "Search Patients",
    "Delete Patient",
    "Export Patient Data (CSV)",
    "Logout",
];

const PORTAL_MENU: &[&str] = &[
    "View Medical Records",
    "Add Medication Reminder",
    "View Medication Reminders",
    "Request Medication Refill",
    "View Health Education Resources",
    "Logout",
];

const ACCESS_CODE_PROMPT: &str = "Enter patient's access code: ";

pub struct Console<P: Prompter, W: Write> {
    registry: SharedRegistry,
    store: DataStore,
    reminder_from: EmailAddress,
    sender: Box<dyn ReminderSender>,
    prompter: P,
    out: W,
    closed: bool,
}

impl<P: Prompter, W: Write> Console<P, W> {
    /// A console that queues appointment reminders in the configured outbox.
    pub fn new(
        registry: SharedRegistry,
        store: DataStore,
        cfg: &CoreConfig,
        prompter: P,
        out: W,
    ) -> Self {
        Self::with_sender(
            registry,
            store,
            cfg.reminder_from().clone(),
            Box::new(OutboxSender::new(cfg.outbox_dir())),
            prompter,
            out,
        )
    }

    pub fn with_sender(
        registry: SharedRegistry,
        store: DataStore,
        reminder_from: EmailAddress,
        sender: Box<dyn ReminderSender>,
        prompter: P,
        out: W,
    ) -> Self {
        Self {
            registry,
            store,
            reminder_from,
            sender,
            prompter,
            out,
            closed: false,
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (P, W) {
        (self.prompter, self.out)
    }

    // ------------------------------------------------------------------
    // Input helpers
    // ------------------------------------------------------------------

    fn ask(&mut self, label: &str) -> Option<String> {
        if self.closed {
            return None;
        }
        match self.prompter.prompt(label) {
            Some(line) => Some(line.trim().to_string()),
            None => {
                self.closed = true;
                None
            }
        }
    }

    /// Prints a numbered menu and reads a choice.
    fn menu(&mut self, title: &str, items: &[&str]) -> io::Result<Option<String>> {
        writeln!(self.out, "\n{title}:")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, item)?;
        }
        Ok(self.ask(&format!("Enter your choice (1-{}): ", items.len())))
    }

    fn ask_number(&mut self, label: &str) -> io::Result<Option<u32>> {
        let Some(raw) = self.ask(label) else {
            return Ok(None);
        };
        match raw.parse::<u32>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                writeln!(self.out, "Invalid input. Please enter a number.")?;
                Ok(None)
            }
        }
    }

    /// Reads a 1-based index and converts it to a zero-based one.
    fn ask_index(&mut self, label: &str) -> io::Result<Option<usize>> {
        match self.ask_number(label)? {
            Some(0) => {
                writeln!(self.out, "Entries are numbered from 1.")?;
                Ok(None)
            }
            n => Ok(n.map(|n| n as usize - 1)),
        }
    }

    fn ask_optional(&mut self, label: &str) -> Option<Option<String>> {
        let value = self.ask(label)?;
        Some((!value.is_empty()).then_some(value))
    }

    fn ask_entry(&mut self, qualifier: &str) -> Option<MediLinkResult<MedicalRecordEntry>> {
        let condition = self.ask(&format!("Enter {qualifier}medical condition: "))?;
        let medications = self.ask(&format!("Enter {qualifier}medications (comma-separated): "))?;
        let allergies = self.ask(&format!("Enter {qualifier}allergies (comma-separated): "))?;
        let timestamp = self.ask("Enter timestamp (YYYY-MM-DD HH:MM:SS, blank for now): ")?;
        let url = self.ask("Enter reference URL (optional): ")?;

        Some(NonEmptyText::new(&condition).map_err(MediLinkError::from).and_then(|_| {
            MedicalRecordEntry::from_input(&condition, &medications, &allergies, &timestamp, &url)
        }))
    }

    // ------------------------------------------------------------------
    // Output helpers
    // ------------------------------------------------------------------

    fn report(&mut self, e: MediLinkError) -> io::Result<()> {
        tracing::debug!("menu action failed: {:?}", e);
        match e {
            MediLinkError::AccessDenied => {
                writeln!(self.out, "Access denied. Invalid access code.")
            }
            MediLinkError::InvalidCredentials => {
                writeln!(self.out, "Invalid credentials. Please try again.")
            }
            MediLinkError::PatientNotFound(name) => {
                writeln!(self.out, "Patient '{name}' not found.")
            }
            other => writeln!(self.out, "Error: {other}"),
        }
    }

    fn print_entry(&mut self, entry: &MedicalRecordEntry) -> io::Result<()> {
        writeln!(self.out, "Condition: {}", entry.condition)?;
        writeln!(self.out, "Medications: {}", entry.medications.join(", "))?;
        writeln!(self.out, "Allergies: {}", entry.allergies.join(", "))?;
        writeln!(self.out, "Timestamp: {}", entry.formatted_timestamp())?;
        if let Some(url) = &entry.url {
            writeln!(self.out, "Reference: {url}")?;
        }
        writeln!(self.out, "------------------------")
    }

    fn print_records(&mut self, patient: &Patient) -> io::Result<()> {
        if patient.medical_records.is_empty() {
            return writeln!(self.out, "No medical records found for this patient.");
        }
        writeln!(self.out, "Medical Records for {}:", patient.name)?;
        if let Some(location) = &patient.location {
            writeln!(self.out, "Location: {location}")?;
        }
        for entry in &patient.medical_records {
            self.print_entry(entry)?;
        }
        Ok(())
    }

    fn print_reminders(&mut self, patient: &Patient) -> io::Result<bool> {
        if patient.medication_reminders.is_empty() {
            writeln!(self.out, "No medication reminders set.")?;
            return Ok(false);
        }
        writeln!(self.out, "Current Medication Reminders:")?;
        for (i, reminder) in patient.medication_reminders.iter().enumerate() {
            writeln!(
                self.out,
                "{}. Medication: {}, Frequency: {}",
                i + 1,
                reminder.medication,
                reminder.frequency
            )?;
        }
        Ok(true)
    }

    fn snapshot(&mut self, patient: &Patient) {
        if let Err(e) = self.store.save_patient_snapshot(patient) {
            tracing::warn!("failed to snapshot patient '{}': {}", patient.name, e);
        }
    }

    fn save(&mut self) -> io::Result<()> {
        let result = self
            .registry
            .snapshot()
            .and_then(|snapshot| self.store.save(&snapshot));
        if let Err(e) = result {
            tracing::error!("failed to save registry: {}", e);
            writeln!(self.out, "Failed to save data: {e}")?;
        }
        Ok(())
    }

    fn info_page(&mut self, page: &InfoPage) -> io::Result<()> {
        page.render(&mut self.out)?;
        self.ask("Press Enter to return to the main menu.");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Main and login menus
    // ------------------------------------------------------------------

    /// Runs the main menu until the user exits or input closes, then saves.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(choice) = self.menu("Main Menu", MAIN_MENU)? {
            match choice.as_str() {
                "1" => self.login_menu()?,
                "2" => self.info_page(&pages::EMERGENCY_SERVICES)?,
                "3" => self.info_page(&pages::NEAREST_FACILITIES)?,
                "4" => self.info_page(&pages::COVID19)?,
                "5" => self.info_page(&pages::HEALTH_TIPS)?,
                "6" => self.info_page(&pages::VACCINATION)?,
                "7" => self.info_page(&pages::MENTAL_HEALTH)?,
                "8" => self.info_page(&pages::FIRST_AID)?,
                "9" => self.info_page(&pages::CONTACT_US)?,
                "10" => self.education_browser()?,
                "11" => {
                    self.save()?;
                    return writeln!(self.out, "Exiting the HealthLink System. Goodbye!");
                }
                _ => writeln!(
                    self.out,
                    "Invalid choice. Please enter a number between 1 and 11."
                )?,
            }
        }

        self.save()
    }

    fn login_menu(&mut self) -> io::Result<()> {
        while let Some(choice) = self.menu("Login/Signup Menu", LOGIN_MENU)? {
            match choice.as_str() {
                "1" => self.staff_login()?,
                "2" => self.patient_login()?,
                "3" => self.create_staff_profile()?,
                "4" => self.create_patient_account()?,
                "5" => self.list_staff()?,
                "6" => return Ok(()),
                _ => writeln!(
                    self.out,
                    "Invalid choice. Please enter a number between 1 and 6."
                )?,
            }
        }
        Ok(())
    }

    fn staff_login(&mut self) -> io::Result<()> {
        let Some(name) = self.ask("Enter your name: ") else {
            return Ok(());
        };
        let Some(password) = self.ask("Enter your password: ") else {
            return Ok(());
        };

        let result = self.registry.try_read(|r| {
            r.authenticate_provider(&name, &password)
                .map(|p| p.name.as_str().to_string())
        });
        match result {
            Ok(provider) => {
                writeln!(self.out, "Welcome, {provider}.")?;
                self.staff_menu(&provider)
            }
            Err(e) => self.report(e),
        }
    }

    fn patient_login(&mut self) -> io::Result<()> {
        let Some(code) = self.ask("Enter your access code: ") else {
            return Ok(());
        };
        let found = self
            .registry
            .read(|r| r.patient_by_access_code(&code).is_some());
        match found {
            Ok(true) => self.patient_portal(&code),
            Ok(false) => writeln!(self.out, "Invalid access code."),
            Err(e) => self.report(e),
        }
    }

    fn create_staff_profile(&mut self) -> io::Result<()> {
        let Some(name) = self.ask("Enter your name: ") else {
            return Ok(());
        };
        let Some(password) = self.ask("Enter your password: ") else {
            return Ok(());
        };

        let result = text_pair(&name, &password).and_then(|(name, password)| {
            self.registry
                .try_write(|r| r.create_staff_profile(name, &password))
        });
        match result {
            Ok(()) => writeln!(self.out, "Profile created successfully."),
            Err(e) => self.report(e),
        }
    }

    fn create_patient_account(&mut self) -> io::Result<()> {
        let Some(name) = self.ask("Enter patient name: ") else {
            return Ok(());
        };
        let Some(entry) = self.ask_entry("") else {
            return Ok(());
        };
        let Some(email) = self.ask_optional("Enter email for appointment reminders (optional): ")
        else {
            return Ok(());
        };

        let result = build_new_patient(&name, entry, None, email, None).and_then(|new_patient| {
            self.registry
                .try_write(|r| r.create_patient_account(new_patient).cloned())
        });
        match result {
            Ok(patient) => {
                self.snapshot(&patient);
                writeln!(
                    self.out,
                    "Patient account created successfully. Your access code is: {}",
                    patient.access_code
                )?;
                writeln!(
                    self.out,
                    "Please keep this access code safe, as you'll need it to log in."
                )
            }
            Err(e) => self.report(e),
        }
    }

    fn list_staff(&mut self) -> io::Result<()> {
        let names = self
            .registry
            .read(|r| {
                r.staff()
                    .names()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            });
        match names {
            Ok(names) if names.is_empty() => {
                writeln!(self.out, "No hospital staff profiles found.")
            }
            Ok(names) => {
                writeln!(self.out, "List of Hospital Staff:")?;
                for name in names {
                    writeln!(self.out, "Name: {name}")?;
                }
                Ok(())
            }
            Err(e) => self.report(e),
        }
    }

    fn education_browser(&mut self) -> io::Result<()> {
        let catalog = match self.registry.read(|r| r.education_resources()) {
            Ok(catalog) => catalog,
            Err(e) => return self.report(e),
        };

        writeln!(self.out, "\nHealth Education Resources:")?;
        for resource in catalog.iter() {
            writeln!(self.out, "{}: {}", resource.condition, resource.url)?;
        }

        while let Some(choice) = self.menu(
            "Options",
            &["Search for a specific condition", "Return to previous menu"],
        )? {
            match choice.as_str() {
                "1" => {
                    let Some(term) = self.ask("Enter the condition you're looking for: ") else {
                        return Ok(());
                    };
                    let matches = catalog.search(&term);
                    if matches.is_empty() {
                        writeln!(self.out, "No matching conditions found.")?;
                    }
                    for resource in matches {
                        writeln!(self.out, "{}: {}", resource.condition, resource.url)?;
                    }
                }
                "2" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice. Please enter 1 or 2.")?,
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hospital staff menu
    // ------------------------------------------------------------------

    fn staff_menu(&mut self, provider: &str) -> io::Result<()> {
        while let Some(choice) = self.menu("Hospital Staff Menu", STAFF_MENU)? {
            let Ok(choice) = choice.parse::<usize>() else {
                writeln!(self.out, "Invalid input. Please enter a number.")?;
                continue;
            };

            match choice {
                1 => self.access_records(provider)?,
                2 => self.register_patient(provider)?,
                3 => self.add_record(provider)?,
                4 => self.update_record(provider)?,
                5 => self.print_patient_records(provider)?,
                6 => self.list_access_codes(provider)?,
                7 => self.check_appointment()?,
                8 => self.schedule_appointment(provider, false)?,
                9 => self.schedule_appointment(provider, true)?,
                10 => self.cancel_appointment(provider)?,
                11 => self.patient_report()?,
                12 => self.view_counts(true)?,
                13 => self.update_counts(true)?,
                14 => self.view_counts(false)?,
                15 => self.update_counts(false)?,
                16 => self.add_medication_reminder(Accessor::Provider(provider), None)?,
                17 => self.update_medication_reminder(provider)?,
                18 => self.request_refill(Accessor::Provider(provider), None)?,
                19 => self.contact_provider(provider)?,
                20 => self.education_browser()?,
                21 => self.search_patients()?,
                22 => self.delete_patient(provider)?,
                23 => self.export_csv()?,
                24 => return writeln!(self.out, "Logging out..."),
                _ => writeln!(
                    self.out,
                    "Invalid choice. Please enter a number between 1 and 24."
                )?,
            }
        }
        Ok(())
    }

    fn access_records(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        match self
            .registry
            .try_read(|r| r.share_medical_record(&code, provider).cloned())
        {
            Ok(patient) => self.print_records(&patient),
            Err(e) => self.report(e),
        }
    }

    fn register_patient(&mut self, provider: &str) -> io::Result<()> {
        let Some(name) = self.ask("Enter patient's name: ") else {
            return Ok(());
        };
        let Some(entry) = self.ask_entry("") else {
            return Ok(());
        };
        let Some(location) = self.ask_optional("Enter patient's location (optional): ") else {
            return Ok(());
        };
        let Some(email) = self.ask_optional("Enter patient's email (optional): ") else {
            return Ok(());
        };
        let Some(code) = self.ask_optional("Enter access code (blank to generate): ") else {
            return Ok(());
        };

        let result = build_new_patient(&name, entry, location, email, code).and_then(|new_patient| {
            self.registry
                .try_write(|r| r.register_patient(provider, new_patient).cloned())
        });
        match result {
            Ok(patient) => {
                self.snapshot(&patient);
                writeln!(
                    self.out,
                    "Patient {} registered with access code: {}",
                    patient.name, patient.access_code
                )
            }
            Err(e) => self.report(e),
        }
    }

    fn add_record(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let Some(entry) = self.ask_entry("updated ") else {
            return Ok(());
        };
        let Some(location) = self.ask_optional("Enter updated location (blank to keep): ") else {
            return Ok(());
        };
        let Some(email) = self.ask_optional("Enter updated email (blank to keep): ") else {
            return Ok(());
        };

        let email = email
            .map(EmailAddress::parse)
            .transpose()
            .map_err(MediLinkError::from);
        let result = entry.and_then(|entry| Ok((entry, email?))).and_then(|(entry, email)| {
            self.registry.try_write(|r| {
                r.add_record(provider, &code, entry)?;
                if let Some(location) = &location {
                    r.update_location(provider, &code, location)?;
                }
                if email.is_some() {
                    r.update_email(Accessor::Provider(provider), &code, email)?;
                }
                r.provider_patient(provider, &code).cloned()
            })
        });
        match result {
            Ok(patient) => {
                self.snapshot(&patient);
                writeln!(self.out, "Patient medical information updated successfully.")
            }
            Err(e) => self.report(e),
        }
    }

    fn update_record(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let patient = match self
            .registry
            .try_read(|r| r.provider_patient(provider, &code).cloned())
        {
            Ok(patient) => patient,
            Err(e) => return self.report(e),
        };
        if patient.medical_records.is_empty() {
            return writeln!(self.out, "No medical records found for this patient.");
        }

        for (i, entry) in patient.medical_records.iter().enumerate() {
            writeln!(self.out, "{}. {} ({})", i + 1, entry.condition, entry.formatted_timestamp())?;
        }
        let Some(index) = self.ask_index("Enter the number of the entry to update: ")? else {
            return Ok(());
        };
        let Some(entry) = self.ask_entry("updated ") else {
            return Ok(());
        };

        let result = entry.and_then(|entry| {
            self.registry.try_write(|r| {
                r.replace_record(provider, &code, index, entry)?;
                r.provider_patient(provider, &code).cloned()
            })
        });
        match result {
            Ok(patient) => {
                self.snapshot(&patient);
                writeln!(self.out, "Medical record updated successfully.")
            }
            Err(e) => self.report(e),
        }
    }

    fn print_patient_records(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        match self
            .registry
            .try_read(|r| r.provider_patient(provider, &code).cloned())
        {
            Ok(patient) => {
                self.snapshot(&patient);
                self.print_records(&patient)
            }
            Err(e) => self.report(e),
        }
    }

    fn list_access_codes(&mut self, provider: &str) -> io::Result<()> {
        let result = self.registry.try_read(|r| {
            r.list_access_codes(provider).map(|codes| {
                codes
                    .into_iter()
                    .map(|(name, code)| (name.to_string(), code.to_string()))
                    .collect::<Vec<_>>()
            })
        });
        match result {
            Ok(codes) if codes.is_empty() => writeln!(self.out, "No patients found."),
            Ok(codes) => {
                writeln!(self.out, "List of Access Codes with Patient Names:")?;
                for (name, code) in codes {
                    writeln!(self.out, "Access Code: {code}, Name: {name}")?;
                }
                Ok(())
            }
            Err(e) => self.report(e),
        }
    }

    fn check_appointment(&mut self) -> io::Result<()> {
        let Some(name) = self.ask("Enter patient's name: ") else {
            return Ok(());
        };
        match self.registry.read(|r| r.appointment_for(&name)) {
            Ok(Some(date)) => writeln!(
                self.out,
                "Appointment Reminder: Your appointment is on {date}."
            ),
            Ok(None) => writeln!(self.out, "No appointment scheduled for this patient."),
            Err(e) => self.report(e),
        }
    }

    fn schedule_appointment(&mut self, provider: &str, reschedule: bool) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let label = if reschedule {
            "Enter new appointment date (YYYY-MM-DD): "
        } else {
            "Enter appointment date (YYYY-MM-DD): "
        };
        let Some(raw_date) = self.ask(label) else {
            return Ok(());
        };

        let result = parse_appointment_date(&raw_date).and_then(|date| {
            self.registry.try_write(|r| {
                if reschedule {
                    r.reschedule_appointment(provider, &code, date)
                } else {
                    r.schedule_appointment(provider, &code, date)
                }
            })
        });
        let notice = match result {
            Ok(notice) => notice,
            Err(e) => return self.report(e),
        };

        writeln!(
            self.out,
            "Appointment for {} set for {}.",
            notice.patient_name, notice.date
        )?;
        match deliver_appointment_reminder(self.sender.as_ref(), &self.reminder_from, &notice) {
            ReminderOutcome::Queued { to } => {
                writeln!(self.out, "Appointment reminder sent to {to}.")
            }
            ReminderOutcome::NoEmail => {
                writeln!(self.out, "Patient email not set. Cannot send reminder.")
            }
            ReminderOutcome::Failed(reason) => {
                writeln!(self.out, "Failed to send appointment reminder: {reason}")
            }
        }
    }

    fn cancel_appointment(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        match self
            .registry
            .try_write(|r| r.cancel_appointment(provider, &code))
        {
            Ok(date) => writeln!(self.out, "Appointment on {date} cancelled."),
            Err(MediLinkError::NoAppointment(_)) => {
                writeln!(self.out, "No appointment found to cancel.")
            }
            Err(e) => self.report(e),
        }
    }

    fn patient_report(&mut self) -> io::Result<()> {
        let Some(name) = self.ask("Enter patient's name: ") else {
            return Ok(());
        };
        let result = self.registry.try_read(|r| {
            r.patient_report(&name)
                .map(|report| (report.name.to_string(), report.entries.to_vec()))
        });
        match result {
            Ok((name, entries)) => {
                if entries.is_empty() {
                    return writeln!(self.out, "No medical records found for this patient.");
                }
                writeln!(self.out, "Patient Report for {name}:")?;
                for entry in &entries {
                    self.print_entry(entry)?;
                }
                Ok(())
            }
            Err(MediLinkError::PatientNotFound(_)) => writeln!(
                self.out,
                "Patient not found. Unable to generate the report."
            ),
            Err(e) => self.report(e),
        }
    }

    /// Shows inventory (`true`) or bed occupancy (`false`).
    fn view_counts(&mut self, inventory: bool) -> io::Result<()> {
        let rows = self.registry.read(|r| {
            let table = if inventory {
                &r.clinic().inventory
            } else {
                &r.clinic().bed_occupancy
            };
            table
                .iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Vec<_>>()
        });
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => return self.report(e),
        };

        match (rows.is_empty(), inventory) {
            (true, true) => writeln!(self.out, "Inventory is empty."),
            (true, false) => writeln!(self.out, "No bed occupancy data available."),
            (false, _) => {
                let title = if inventory {
                    "Current Inventory:"
                } else {
                    "Current Bed Occupancy:"
                };
                writeln!(self.out, "{title}")?;
                for (key, count) in rows {
                    writeln!(self.out, "{key}: {count}")?;
                }
                Ok(())
            }
        }
    }

    fn update_counts(&mut self, inventory: bool) -> io::Result<()> {
        let (key_label, count_label) = if inventory {
            ("Enter item name: ", "Enter quantity: ")
        } else {
            ("Enter ward name: ", "Enter current occupancy: ")
        };
        let Some(key) = self.ask(key_label) else {
            return Ok(());
        };
        let Some(count) = self.ask_number(count_label)? else {
            return Ok(());
        };

        let result = self.registry.try_write(|r| {
            if inventory {
                r.set_inventory(&key, count)
            } else {
                r.set_bed_occupancy(&key, count)
            }
        });
        match (result, inventory) {
            (Ok(()), true) => writeln!(self.out, "Inventory updated successfully."),
            (Ok(()), false) => writeln!(self.out, "Bed availability updated successfully."),
            (Err(e), _) => self.report(e),
        }
    }

    /// `code` is `None` when the access code still has to be asked for.
    fn add_medication_reminder(
        &mut self,
        accessor: Accessor<'_>,
        code: Option<&str>,
    ) -> io::Result<()> {
        let code = match code {
            Some(code) => code.to_string(),
            None => match self.ask(ACCESS_CODE_PROMPT) {
                Some(code) => code,
                None => return Ok(()),
            },
        };
        let Some(medication) = self.ask("Enter medication name: ") else {
            return Ok(());
        };
        let Some(frequency) = self.ask("Enter medication reminder frequency: ") else {
            return Ok(());
        };

        let result = text_pair(&medication, &frequency).and_then(|(medication, frequency)| {
            self.registry
                .try_write(|r| r.add_medication_reminder(accessor, &code, medication, frequency))
        });
        match result {
            Ok(()) => writeln!(self.out, "Medication reminder added successfully."),
            Err(e) => self.report(e),
        }
    }

    fn update_medication_reminder(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let patient = match self
            .registry
            .try_read(|r| r.provider_patient(provider, &code).cloned())
        {
            Ok(patient) => patient,
            Err(e) => return self.report(e),
        };
        if !self.print_reminders(&patient)? {
            return Ok(());
        }

        let Some(index) = self.ask_index("Enter the index of the reminder to update: ")? else {
            return Ok(());
        };
        let Some(medication) = self.ask("Enter updated medication name: ") else {
            return Ok(());
        };
        let Some(frequency) = self.ask("Enter updated medication reminder frequency: ") else {
            return Ok(());
        };

        let result = text_pair(&medication, &frequency).and_then(|(medication, frequency)| {
            self.registry.try_write(|r| {
                r.update_medication_reminder(
                    Accessor::Provider(provider),
                    &code,
                    index,
                    medication,
                    frequency,
                )
            })
        });
        match result {
            Ok(()) => writeln!(self.out, "Medication reminder updated successfully."),
            Err(e) => self.report(e),
        }
    }

    fn request_refill(&mut self, accessor: Accessor<'_>, code: Option<&str>) -> io::Result<()> {
        let code = match code {
            Some(code) => code.to_string(),
            None => match self.ask(ACCESS_CODE_PROMPT) {
                Some(code) => code,
                None => return Ok(()),
            },
        };
        let Some(medication) = self.ask("Enter medication name: ") else {
            return Ok(());
        };
        let Some(quantity) = self.ask_number("Enter quantity: ")? else {
            return Ok(());
        };

        let result = NonEmptyText::new(&medication)
            .map_err(MediLinkError::from)
            .and_then(|medication| {
                self.registry
                    .try_read(|r| r.request_medication_refill(accessor, &code, medication, quantity))
            });
        match result {
            Ok(request) => {
                writeln!(self.out, "Medication refill request for {}:", request.patient_name)?;
                writeln!(self.out, "Medication: {}", request.medication)?;
                writeln!(self.out, "Quantity: {}", request.quantity)?;
                writeln!(self.out, "Request sent to pharmacy.")
            }
            Err(e) => self.report(e),
        }
    }

    fn contact_provider(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let Some(provider_contact) = self.ask("Enter provider's contact information: ") else {
            return Ok(());
        };
        let Some(patient_contact) = self.ask("Enter patient's contact information: ") else {
            return Ok(());
        };

        let result = text_pair(&provider_contact, &patient_contact).and_then(
            |(provider_contact, patient_contact)| {
                self.registry.try_read(|r| {
                    r.contact_provider(provider, &code, provider_contact, patient_contact)
                })
            },
        );
        match result {
            Ok(message) => {
                writeln!(
                    self.out,
                    "Contacting healthcare provider: {}",
                    message.provider_contact
                )?;
                writeln!(
                    self.out,
                    "Patient contact information: {}",
                    message.patient_contact
                )?;
                writeln!(self.out, "Message sent to healthcare provider.")
            }
            Err(e) => self.report(e),
        }
    }

    fn search_patients(&mut self) -> io::Result<()> {
        let Some(keyword) = self.ask("Enter patient name or access code: ") else {
            return Ok(());
        };
        let result = self.registry.read(|r| {
            r.search_patients(&keyword)
                .into_iter()
                .map(|p| (p.name.as_str().to_string(), p.access_code.to_string()))
                .collect::<Vec<_>>()
        });
        match result {
            Ok(found) if found.is_empty() => writeln!(self.out, "No matching patients found."),
            Ok(found) => {
                writeln!(self.out, "Matching Patients:")?;
                for (name, code) in found {
                    writeln!(self.out, "Name: {name}, Access Code: {code}")?;
                }
                Ok(())
            }
            Err(e) => self.report(e),
        }
    }

    fn delete_patient(&mut self, provider: &str) -> io::Result<()> {
        let Some(code) = self.ask(ACCESS_CODE_PROMPT) else {
            return Ok(());
        };
        let Some(confirm) = self.ask("Delete this patient and all their records? (y/N): ") else {
            return Ok(());
        };
        if !confirm.eq_ignore_ascii_case("y") {
            return writeln!(self.out, "Deletion cancelled.");
        }

        match self
            .registry
            .try_write(|r| r.delete_patient(provider, &code))
        {
            Ok(patient) => {
                if let Err(e) = self.store.delete_patient_snapshots(patient.name.as_str()) {
                    tracing::warn!("failed to remove snapshots of '{}': {}", patient.name, e);
                }
                writeln!(self.out, "Patient {} deleted.", patient.name)
            }
            Err(e) => self.report(e),
        }
    }

    fn export_csv(&mut self) -> io::Result<()> {
        let data_dir = self.store.data_dir().to_path_buf();
        match self
            .registry
            .patients()
            .and_then(|patients| export_to_path(&patients, &data_dir))
        {
            Ok(path) => writeln!(self.out, "Patient data exported to {}", path.display()),
            Err(e) => self.report(e),
        }
    }

    // ------------------------------------------------------------------
    // Patient portal
    // ------------------------------------------------------------------

    fn patient_portal(&mut self, code: &str) -> io::Result<()> {
        while let Some(choice) = self.menu("Patient Portal Menu", PORTAL_MENU)? {
            match choice.as_str() {
                "1" => match self
                    .registry
                    .try_read(|r| r.access_patient(Accessor::Patient, code).cloned())
                {
                    Ok(patient) => self.print_records(&patient)?,
                    Err(e) => self.report(e)?,
                },
                "2" => self.add_medication_reminder(Accessor::Patient, Some(code))?,
                "3" => match self
                    .registry
                    .try_read(|r| r.access_patient(Accessor::Patient, code).cloned())
                {
                    Ok(patient) => {
                        self.print_reminders(&patient)?;
                    }
                    Err(e) => self.report(e)?,
                },
                "4" => self.request_refill(Accessor::Patient, Some(code))?,
                "5" => self.education_browser()?,
                "6" => return writeln!(self.out, "Logging out..."),
                _ => writeln!(
                    self.out,
                    "Invalid choice. Please enter a number between 1 and 6."
                )?,
            }
        }
        Ok(())
    }
}

fn text_pair(first: &str, second: &str) -> MediLinkResult<(NonEmptyText, NonEmptyText)> {
    Ok((NonEmptyText::new(first)?, NonEmptyText::new(second)?))
}

fn build_new_patient(
    name: &str,
    entry: MediLinkResult<MedicalRecordEntry>,
    location: Option<String>,
    email: Option<String>,
    access_code: Option<String>,
) -> MediLinkResult<NewPatient> {
    let mut new_patient = NewPatient::new(NonEmptyText::new(name)?, entry?);
    new_patient.location = location;
    new_patient.email = email.map(EmailAddress::parse).transpose()?;
    new_patient.access_code = access_code.map(AccessCode::parse).transpose()?;
    Ok(new_patient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use medilink_core::constants::PATIENTS_FILENAME;
    use medilink_core::Registry;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        registry: SharedRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = Registry::new();
            registry
                .register_provider(
                    NonEmptyText::new("City Hospital").unwrap(),
                    &NonEmptyText::new("pw").unwrap(),
                )
                .unwrap();
            Self {
                temp_dir: TempDir::new().expect("Failed to create temp dir"),
                registry: SharedRegistry::new(registry),
            }
        }

        fn run(&self, answers: &[&str]) -> String {
            self.run_with_labels(answers).0
        }

        /// Output plus every prompt label shown, in order.
        fn run_with_labels(&self, answers: &[&str]) -> (String, Vec<String>) {
            let cfg = CoreConfig::with_data_dir(self.temp_dir.path().to_path_buf()).unwrap();
            let mut console = Console::new(
                self.registry.clone(),
                DataStore::from_config(&cfg),
                &cfg,
                ScriptedPrompter::new(answers.iter().copied()),
                Vec::new(),
            );
            console.run().expect("console should not fail on in-memory output");
            let (prompter, out) = console.into_parts();
            (String::from_utf8(out).unwrap(), prompter.labels)
        }
    }

    /// Answers for staff menu option 2 with an explicit access code.
    fn register_answers<'a>(name: &'a str, email: &'a str, code: &'a str) -> Vec<&'a str> {
        vec![
            "2", name, "Asthma", "Inhaler, Prednisone", "Peanuts", "", "", "Ward 3", email, code,
        ]
    }

    fn staff_session(steps: Vec<&str>) -> Vec<&str> {
        let mut answers = vec!["1", "1", "City Hospital", "pw"];
        answers.extend(steps);
        answers.extend(["24", "6", "11"]);
        answers
    }

    #[test]
    fn invalid_choice_reprompts_and_exit_saves() {
        let fixture = Fixture::new();
        let output = fixture.run(&["42", "11"]);

        assert!(output.contains("Invalid choice. Please enter a number between 1 and 11."));
        assert!(output.contains("Goodbye!"));
        assert!(fixture.temp_dir.path().join(PATIENTS_FILENAME).is_file());
    }

    #[test]
    fn closed_input_unwinds_and_saves() {
        let fixture = Fixture::new();
        let output = fixture.run(&["1", "1", "City Hospital"]);

        assert!(!output.contains("Goodbye!"));
        assert!(fixture.temp_dir.path().join(PATIENTS_FILENAME).is_file());
    }

    #[test]
    fn info_pages_wait_for_enter() {
        let fixture = Fixture::new();
        let output = fixture.run(&["2", "", "7", "", "11"]);
        assert!(output.contains("Poison Control Center"));
        assert!(output.contains("Crisis Text Line"));
    }

    #[test]
    fn wrong_staff_password_is_rejected() {
        let fixture = Fixture::new();
        let output = fixture.run(&["1", "1", "City Hospital", "nope", "6", "11"]);
        assert!(output.contains("Invalid credentials. Please try again."));
        assert!(!output.contains("Hospital Staff Menu"));
    }

    #[test]
    fn staff_register_and_print_records() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.extend(["5", "1234567890", "6"]);
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Patient Jane Doe registered with access code: 1234567890"));
        assert!(output.contains("Medical Records for Jane Doe:"));
        assert!(output.contains("Medications: Inhaler, Prednisone"));
        assert!(output.contains("Access Code: 1234567890, Name: Jane Doe"));
        assert!(fixture
            .temp_dir
            .path()
            .join("patient_records")
            .join("Jane Doe")
            .is_dir());
    }

    #[test]
    fn non_numeric_staff_choice_is_reported() {
        let fixture = Fixture::new();
        let output = fixture.run(&staff_session(vec!["abc", "99"]));
        assert!(output.contains("Invalid input. Please enter a number."));
        assert!(output.contains("Invalid choice. Please enter a number between 1 and 24."));
    }

    #[test]
    fn bad_indices_do_not_crash() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.extend(["4", "1234567890", "x"]);
        steps.extend(["4", "1234567890", "7", "Flu", "", "", "", ""]);
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Invalid input. Please enter a number."));
        assert!(output.contains("out of range"));
    }

    #[test]
    fn scheduling_queues_reminder_in_outbox() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "jane@example.org", "1234567890");
        steps.extend(["8", "1234567890", "2025-05-05", "7", "Jane Doe"]);
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Appointment reminder sent to jane@example.org."));
        assert!(output.contains("Appointment Reminder: Your appointment is on 2025-05-05."));
        let queued = std::fs::read_dir(fixture.temp_dir.path().join("outbox"))
            .unwrap()
            .count();
        assert_eq!(queued, 1);
    }

    #[test]
    fn other_providers_patients_are_denied() {
        let fixture = Fixture::new();
        fixture
            .registry
            .try_write(|r| {
                r.register_provider(
                    NonEmptyText::new("General Clinic").unwrap(),
                    &NonEmptyText::new("pw2").unwrap(),
                )?;
                r.register_patient(
                    "General Clinic",
                    NewPatient {
                        access_code: Some(AccessCode::parse("5555555555").unwrap()),
                        ..NewPatient::new(
                            NonEmptyText::new("John Roe").unwrap(),
                            MedicalRecordEntry::now("Flu", vec![], vec![]),
                        )
                    },
                )
                .map(|_| ())
            })
            .unwrap();

        let output = fixture.run(&staff_session(vec!["5", "5555555555", "1", "5555555555"]));
        assert!(output.contains("Access denied. Invalid access code."));
        // Read-only sharing across providers still works.
        assert!(output.contains("Medical Records for John Roe:"));
    }

    #[test]
    fn patient_portal_asks_for_code_once() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.extend(["24", "2", "1234567890", "1", "2", "Insulin", "daily", "3", "6", "6", "11"]);
        let mut answers = vec!["1", "1", "City Hospital", "pw"];
        answers.extend(steps);
        let (output, labels) = fixture.run_with_labels(&answers);

        let code_prompts = labels
            .iter()
            .filter(|l| l.as_str() == "Enter your access code: ")
            .count();
        assert_eq!(code_prompts, 1);
        assert!(output.contains("Patient Portal Menu:"));
        assert!(output.contains("Medical Records for Jane Doe:"));
        assert!(output.contains("1. Medication: Insulin, Frequency: daily"));
    }

    #[test]
    fn patient_portal_rejects_unknown_code() {
        let fixture = Fixture::new();
        let output = fixture.run(&["1", "2", "WRONG123", "6", "11"]);
        assert!(output.contains("Invalid access code."));
        assert!(!output.contains("Patient Portal Menu:"));
    }

    #[test]
    fn self_signup_then_list_staff() {
        let fixture = Fixture::new();
        let output = fixture.run(&[
            "1", "4", "Sam Smith", "Migraine", "", "", "", "", "", "3", "Dr Grey", "grey", "5",
            "6", "11",
        ]);

        assert!(output.contains("Patient account created successfully. Your access code is: "));
        assert!(output.contains("Profile created successfully."));
        assert!(output.contains("Name: Dr Grey"));
        let owned = fixture
            .registry
            .read(|r| r.provider("City Hospital").unwrap().owns("Sam Smith"))
            .unwrap();
        assert!(owned);
    }

    #[test]
    fn inventory_and_beds_round_trip() {
        let fixture = Fixture::new();
        let output = fixture.run(&staff_session(vec![
            "12", "13", "Gauze", "40", "12", "15", "ICU", "3", "14", "13", "Syringes", "many",
        ]));

        assert!(output.contains("Inventory is empty."));
        assert!(output.contains("Gauze: 40"));
        assert!(output.contains("ICU: 3"));
        assert!(output.contains("Invalid input. Please enter a number."));
    }

    #[test]
    fn education_search_from_main_menu() {
        let fixture = Fixture::new();
        let output = fixture.run(&["10", "1", "zzz", "1", "asth", "2", "11"]);
        assert!(output.contains("No matching conditions found."));
        assert!(output.contains("Asthma: "));
    }

    #[test]
    fn adding_a_record_can_update_contact_details() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.extend([
            "3", "1234567890", "Flu", "Tamiflu", "", "", "", "Ward 9", "jane@example.org",
        ]);
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Patient medical information updated successfully."));
        let patient = fixture
            .registry
            .read(|r| r.patient("Jane Doe").cloned())
            .unwrap()
            .unwrap();
        assert_eq!(patient.medical_records.len(), 2);
        assert_eq!(patient.location.as_deref(), Some("Ward 9"));
        assert_eq!(
            patient.email.as_ref().map(|e| e.as_str()),
            Some("jane@example.org")
        );
    }

    #[test]
    fn delete_requires_confirmation() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.extend(["22", "1234567890", "n", "22", "1234567890", "y", "6"]);
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Deletion cancelled."));
        assert!(output.contains("Patient Jane Doe deleted."));
        assert!(output.contains("No patients found."));
        assert!(!fixture
            .temp_dir
            .path()
            .join("patient_records")
            .join("Jane Doe")
            .exists());

        let store = DataStore::new(fixture.temp_dir.path());
        let reloaded = store.load().unwrap();
        assert!(reloaded.patient("Jane Doe").is_none());
    }

    #[test]
    fn export_writes_csv_into_data_dir() {
        let fixture = Fixture::new();
        let mut steps = register_answers("Jane Doe", "", "1234567890");
        steps.push("23");
        let output = fixture.run(&staff_session(steps));

        assert!(output.contains("Patient data exported to"));
        let csv = std::fs::read_to_string(fixture.temp_dir.path().join("patient_data.csv")).unwrap();
        assert!(csv.starts_with("Name,Access Code,Condition,Medications,Allergies,Timestamp"));
        assert!(csv.contains("Jane Doe,1234567890,Asthma"));
    }
}
