// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of ProgressPrinter structure for printing the progress of reading LAMMPS output files.

use colored::{ColoredString, Colorize};
use std::io::Write;

/// Progress of reading a LAMMPS output file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressStatus {
    /// Reading is in progress.
    Running,
    /// File has been read completely.
    Completed,
    /// Reading failed.
    Failed,
}

/// String that can be used inside `ProgressPrinter`.
#[derive(Debug, Clone, PartialEq)]
struct ProgressMessage {
    msg: ColoredString,
}

impl ProgressMessage {
    /// Create new `ProgressMessage`.
    ///
    /// ## Panics
    /// Panics if the string is longer than 9 characters.
    fn new(string: ColoredString) -> Self {
        if string.chars().count() > 9 {
            panic!("FATAL LAMMPS_RS ERROR | ProgressMessage::new | `ProgressMessage` can not be longer than 9 characters.");
        }

        ProgressMessage { msg: string }
    }

    /// Print formatted `ProgressMessage`.
    fn print(&self, out: &mut dyn Write, colored: bool) {
        if colored {
            write!(out, "[{: ^9}]   ", self.msg)
                .expect("FATAL LAMMPS_RS ERROR | ProgressMessage::print (1) | Could not write to `ProgressPrinter` stream.");
        } else {
            write!(out, "[{: ^9}]   ", self.msg.as_ref() as &str)
                .expect("FATAL LAMMPS_RS ERROR | ProgressMessage::print (2) | Could not write to `ProgressPrinter` stream.");
        }
    }
}

/// Structure handling printing of progress of reading a LAMMPS output file snapshot by snapshot.
/// Constructed using `ProgressPrinter::new()` and associated with the given
/// snapshot iterator using `SnapshotMasterRead::print_progress()`.
pub struct ProgressPrinter {
    /// Stream to write the progress info to.
    output: Box<dyn Write>,
    /// Current status of reading. Default: ProgressStatus::Running.
    status: ProgressStatus,
    /// Frequency of printing. Print every `print_freq`th snapshot. Default: 100 snapshots.
    print_freq: usize,
    /// If true, the output will be colored. Default: true.
    colored: bool,
    /// String to be printed with the number of the current snapshot. Default: "Snapshot".bright_purple().
    snapshot_msg: ColoredString,
    /// String to be printed with the timestep of the current snapshot. Default: "Step".cyan().
    step_msg: ColoredString,
    /// String to be printed when the reading is in progress. Default: "RUNNING".yellow().
    running_msg: ProgressMessage,
    /// String to be printed when the reading is completed. Default: "COMPLETED".green().
    completed_msg: ProgressMessage,
    /// String to be printed when the reading failed. Default: "FAILED!".red().
    failed_msg: ProgressMessage,
    /// String terminating the progress message. Default: `\r` (carriage return).
    terminating: String,
}

impl ProgressPrinter {
    /// Create an instance of `ProgressPrinter` with default parameters.
    ///
    /// The default values of the `ProgressPrinter` parameters.
    /// - `output`: `std::io::stdout()` (stream to write the progress info to)
    /// - `status`: `ProgressStatus::Running` (current status of reading)
    /// - `print_freq`: `100` (progress info will be printed out every 100 snapshots read)
    /// - `colored`: `true` (should the output be colored?)
    /// - `snapshot_msg`: `"Snapshot".bright_purple()` (string associated with the number of the snapshot)
    /// - `step_msg`: `"Step".cyan()` (string associated with the timestep of the snapshot)
    /// - `running_msg`: `"RUNNING".yellow()` (string printed when the reading is running)
    /// - `completed_msg`: `"COMPLETED".green()` (string printed when the reading is completed)
    /// - `failed_msg`: `"FAILED!".red()` (string printed when the reading failed)
    /// - `terminating`: `\r` (string terminating the progress message; useful to set to `\n` when printing to a file)
    ///
    /// You can set custom values for any of the parameters by using `with_%PARAMETER()` method
    /// when constructing the `ProgressPrinter`.
    ///
    /// ## Examples
    /// ```no_run
    /// use lammps_rs::prelude::*;
    /// use colored::Colorize;
    ///
    /// // print info every 200th snapshot read
    /// // yellow string "ANALYZING" will be printed while the dump is being read
    /// // blue string "DONE" will be printed once reading is completed
    /// let printer = ProgressPrinter::new()
    ///     .with_print_freq(200)
    ///     .with_running_msg("ANALYZING".yellow())
    ///     .with_completed_msg("DONE".blue());
    ///
    /// for snapshot in DumpReader::open("dump.lammpstrj")
    ///     .unwrap()
    ///     .snapshots()
    ///     // associate the `ProgressPrinter` with the snapshot iterator
    ///     .print_progress(printer)
    /// {
    ///     let snapshot = snapshot.unwrap();
    ///     // analyze the snapshot
    /// }
    /// ```
    ///
    /// By default, `ProgressPrinter` prints to standard output.
    /// However, you can also let it print into a file.
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let file = std::fs::File::create("progress.log").unwrap();
    /// let printer = ProgressPrinter::new()
    ///     .with_output(Box::from(file))
    ///     // turning off colored output which does not make sense for a file
    ///     .with_colored(false)
    ///     // setting terminating string to `newline` character
    ///     .with_terminating("\n");
    /// ```
    pub fn new() -> Self {
        ProgressPrinter {
            output: Box::from(std::io::stdout()),
            status: ProgressStatus::Running,
            print_freq: 100,
            colored: true,
            snapshot_msg: "Snapshot".bright_purple(),
            step_msg: "Step".cyan(),
            running_msg: ProgressMessage::new("RUNNING".yellow()),
            completed_msg: ProgressMessage::new("COMPLETED".green()),
            failed_msg: ProgressMessage::new("FAILED!".red()),
            terminating: String::from("\r"),
        }
    }

    /// Create new `ProgressPrinter` with specific `output` stream.
    pub fn with_output(mut self, stream: Box<dyn Write>) -> Self {
        self.output = stream;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `status`.
    pub fn with_status(mut self, status: ProgressStatus) -> Self {
        self.status = status;
        self
    }

    /// Set new status to an already constructed `ProgressPrinter`.
    pub fn set_status(&mut self, status: ProgressStatus) {
        self.status = status;
    }

    /// Create new `ProgressPrinter` with specific value for `print_freq`.
    ///
    /// ## Panics
    /// Panics if `print_freq` is zero.
    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        if print_freq == 0 {
            panic!("FATAL LAMMPS_RS ERROR | ProgressPrinter::with_print_freq | Printing frequency must be larger than zero.");
        }

        self.print_freq = print_freq;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `colored`.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `snapshot_msg`.
    pub fn with_snapshot_msg(mut self, snapshot_msg: ColoredString) -> Self {
        self.snapshot_msg = snapshot_msg;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `step_msg`.
    pub fn with_step_msg(mut self, step_msg: ColoredString) -> Self {
        self.step_msg = step_msg;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `running_msg`.
    ///
    /// ## Panics
    /// Panics if the `running_msg` is longer than 9 characters.
    pub fn with_running_msg(mut self, running_msg: ColoredString) -> Self {
        self.running_msg = ProgressMessage::new(running_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `completed_msg`.
    ///
    /// ## Panics
    /// Panics if the `completed_msg` is longer than 9 characters.
    pub fn with_completed_msg(mut self, completed_msg: ColoredString) -> Self {
        self.completed_msg = ProgressMessage::new(completed_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `failed_msg`.
    ///
    /// ## Panics
    /// Panics if the `failed_msg` is longer than 9 characters.
    pub fn with_failed_msg(mut self, failed_msg: ColoredString) -> Self {
        self.failed_msg = ProgressMessage::new(failed_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `terminating`.
    pub fn with_terminating(mut self, string: &str) -> Self {
        self.terminating = string.to_string();
        self
    }

    /// Print progress info about the reading.
    /// `snapshot_number` is the number of snapshots read so far, `timestep` is the timestep of the last snapshot.
    pub fn print(&mut self, snapshot_number: usize, timestep: u64) {
        if self.status == ProgressStatus::Running && snapshot_number % self.print_freq != 0 {
            return;
        }

        match self.status {
            ProgressStatus::Running => self.running_msg.print(&mut self.output, self.colored),
            ProgressStatus::Completed => self.completed_msg.print(&mut self.output, self.colored),
            ProgressStatus::Failed => self.failed_msg.print(&mut self.output, self.colored),
        }

        if self.colored {
            write!(
                self.output,
                "{} {:10} | {} {:12}{}",
                self.snapshot_msg, snapshot_number, self.step_msg, timestep, self.terminating
            )
            .expect("FATAL LAMMPS_RS ERROR | ProgressPrinter::print (1) | Could not write to `ProgressPrinter` stream.");
        } else {
            write!(
                self.output,
                "{} {:10} | {} {:12}{}",
                self.snapshot_msg.as_ref() as &str,
                snapshot_number,
                self.step_msg.as_ref() as &str,
                timestep,
                self.terminating
            )
            .expect("FATAL LAMMPS_RS ERROR | ProgressPrinter::print (2) | Could not write to `ProgressPrinter` stream.");
        }

        match self.status {
            ProgressStatus::Running => (),
            ProgressStatus::Completed | ProgressStatus::Failed => writeln!(self.output)
                .expect("FATAL LAMMPS_RS ERROR | ProgressPrinter::print (3) | Could not write to `ProgressPrinter` stream."),
        }

        self.output
            .flush()
            .expect("FATAL LAMMPS_RS ERROR | ProgressPrinter::print (4) | Could not flush `ProgressPrinter` stream.");
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::{tempfile, NamedTempFile};

    fn assert_default(printer: &ProgressPrinter) {
        assert_eq!(printer.status, ProgressStatus::Running);
        assert_eq!(printer.print_freq, 100);
        assert_eq!(printer.colored, true);
        assert_eq!(printer.snapshot_msg, "Snapshot".bright_purple());
        assert_eq!(printer.step_msg, "Step".cyan());
        assert_eq!(
            printer.running_msg,
            ProgressMessage::new("RUNNING".yellow())
        );
        assert_eq!(
            printer.completed_msg,
            ProgressMessage::new("COMPLETED".green())
        );
        assert_eq!(printer.failed_msg, ProgressMessage::new("FAILED!".red()));
        assert_eq!(printer.terminating, "\r");
    }

    #[test]
    fn new() {
        assert_default(&ProgressPrinter::new());
    }

    #[test]
    fn default() {
        assert_default(&ProgressPrinter::default());
    }

    #[test]
    fn set_status() {
        let mut printer = ProgressPrinter::new();

        printer.set_status(ProgressStatus::Failed);
        assert_eq!(printer.status, ProgressStatus::Failed);

        printer.set_status(ProgressStatus::Completed);
        assert_eq!(printer.status, ProgressStatus::Completed);

        printer.set_status(ProgressStatus::Running);
        assert_eq!(printer.status, ProgressStatus::Running);
    }

    #[test]
    fn new_complex() {
        let tmp_file = tempfile().unwrap();

        let printer = ProgressPrinter::new()
            .with_output(Box::from(tmp_file))
            .with_status(ProgressStatus::Completed)
            .with_print_freq(200)
            .with_colored(false)
            .with_snapshot_msg("FRAME".into())
            .with_step_msg("timestep".yellow())
            .with_running_msg("ANALYZING".red())
            .with_completed_msg("DONE".green())
            .with_failed_msg("FAILURE".on_bright_red())
            .with_terminating("\n");

        assert_eq!(printer.status, ProgressStatus::Completed);
        assert_eq!(printer.print_freq, 200);
        assert_eq!(printer.colored, false);
        assert_eq!(printer.snapshot_msg, "FRAME".into());
        assert_eq!(printer.step_msg, "timestep".yellow());
        assert_eq!(printer.running_msg, ProgressMessage::new("ANALYZING".red()));
        assert_eq!(printer.completed_msg, ProgressMessage::new("DONE".green()));
        assert_eq!(
            printer.failed_msg,
            ProgressMessage::new("FAILURE".on_bright_red())
        );
        assert_eq!(printer.terminating, "\n");
    }

    #[test]
    #[should_panic(
        expected = "FATAL LAMMPS_RS ERROR | ProgressMessage::new | `ProgressMessage` can not be longer than 9 characters."
    )]
    fn progress_message_panic() {
        let _msg = ProgressMessage::new("SHOULD_PANIC".red());
    }

    #[test]
    #[should_panic(
        expected = "FATAL LAMMPS_RS ERROR | ProgressPrinter::with_print_freq | Printing frequency must be larger than zero."
    )]
    fn print_freq_panic() {
        let _printer = ProgressPrinter::new().with_print_freq(0);
    }

    fn print_sequence(printer: &mut ProgressPrinter) {
        printer.print(0, 0);
        printer.print(1, 10);
        printer.print(2, 20);
        printer.print(5, 50);
        printer.print(95, 950);
        printer.print(100, 1000);
        printer.print(101, 1010);
        printer.print(200, 2000);
        printer.print(300, 3000);
        printer.set_status(ProgressStatus::Completed);
        printer.print(401, 4010);
        printer.set_status(ProgressStatus::Failed);
        printer.print(502, 5020);
    }

    #[test]
    fn print() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path().to_owned();

        let mut printer = ProgressPrinter::new()
            .with_output(Box::from(output))
            .with_colored(false);

        print_sequence(&mut printer);

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/progress_expected.txt").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn print_with_newline() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path().to_owned();

        let mut printer = ProgressPrinter::new()
            .with_output(Box::from(output))
            .with_colored(false)
            .with_print_freq(50)
            .with_terminating("\n");

        print_sequence(&mut printer);

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/progress_expected_newline.txt").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }
}
