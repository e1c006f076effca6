//! # CSV Roster Repository
//!
//! Reads and writes `students.csv` at the root of the data directory.
//!
//! ```csv
//! id,name,guardian_identity,class,section,monthly_fee,status
//! STU-001,Ayesha Khan,35201-1234567-1,Class 5,A,5000,active
//! STU-002,Bilal Khan,35201-1234567-1,Class 3,B,4200,active
//! ```
//!
//! The guardian identity is stored as entered; normalization happens when
//! the sibling index is built.

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Writer};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::connection::{CsvConnection, STUDENTS_FILE};
use crate::backend::domain::models::{money::round_money, Student, StudentStatus};
use crate::backend::storage::traits::RosterStorage;

#[derive(Debug, Serialize, Deserialize)]
struct StudentRecord {
    id: String,
    name: String,
    #[serde(default)]
    guardian_identity: String,
    class: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    monthly_fee: String,
    #[serde(default)]
    status: String,
}

impl StudentRecord {
    fn into_domain(self, line: usize) -> Result<Student> {
        let monthly_fee = if self.monthly_fee.trim().is_empty() {
            Decimal::ZERO
        } else {
            self.monthly_fee
                .trim()
                .parse::<Decimal>()
                .map_err(|e| anyhow!("Invalid monthly_fee '{}' on line {}: {}", self.monthly_fee, line, e))?
        };

        let status = match self.status.trim().to_lowercase().as_str() {
            "" | "active" => StudentStatus::Active,
            "inactive" => StudentStatus::Inactive,
            other => {
                warn!("Unknown student status '{}' on line {}, treating as inactive", other, line);
                StudentStatus::Inactive
            }
        };

        Ok(Student {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            guardian_identity: self.guardian_identity.trim().to_string(),
            class_name: self.class.trim().to_string(),
            section: self.section.trim().to_string(),
            monthly_fee: round_money(monthly_fee),
            status,
        })
    }

    fn from_domain(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            guardian_identity: student.guardian_identity.clone(),
            class: student.class_name.clone(),
            section: student.section.clone(),
            monthly_fee: student.monthly_fee.to_string(),
            status: match student.status {
                StudentStatus::Active => "active".to_string(),
                StudentStatus::Inactive => "inactive".to_string(),
            },
        }
    }
}

/// CSV-based student roster
#[derive(Clone)]
pub struct RosterRepository {
    connection: CsvConnection,
}

impl RosterRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_students(&self) -> Result<Vec<Student>> {
        let Some(contents) = self.connection.read_optional(STUDENTS_FILE)? else {
            info!("No {} found, roster is empty", STUDENTS_FILE);
            return Ok(Vec::new());
        };

        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut students = Vec::new();
        for (index, result) in reader.deserialize::<StudentRecord>().enumerate() {
            // header is line 1
            let line = index + 2;
            let record = result.with_context(|| format!("Malformed roster row on line {}", line))?;
            if record.id.trim().is_empty() {
                warn!("Skipping roster row without id on line {}", line);
                continue;
            }
            students.push(record.into_domain(line)?);
        }

        Ok(students)
    }

    fn write_students(&self, students: &[Student]) -> Result<()> {
        let mut writer = Writer::from_writer(Vec::new());
        for student in students {
            writer.serialize(StudentRecord::from_domain(student))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush roster CSV: {}", e))?;
        let contents = String::from_utf8(bytes)?;
        self.connection.write_atomically(STUDENTS_FILE, &contents)
    }
}

impl RosterStorage for RosterRepository {
    fn list_students(&self) -> Result<Vec<Student>> {
        self.read_students()
    }

    fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        Ok(self.read_students()?.into_iter().find(|s| s.id == student_id))
    }

    fn store_student(&self, student: &Student) -> Result<()> {
        let _guard = self.connection.lock_files();
        let mut students = self.read_students()?;
        match students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student.clone(),
            None => students.push(student.clone()),
        }
        self.write_students(&students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (RosterRepository, CsvConnection, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (RosterRepository::new(connection.clone()), connection, temp_dir)
    }

    #[test]
    fn test_read_hand_written_roster() {
        let (repo, connection, _temp_dir) = setup_test_repo();
        connection
            .write_atomically(
                STUDENTS_FILE,
                "id,name,guardian_identity,class,section,monthly_fee,status\n\
                 STU-001,Ayesha Khan,35201-1234567-1,Class 5,A,5000,active\n\
                 STU-002, Bilal Khan ,,Class 3,B,4200.5,\n\
                 STU-003,Sara Ali,61101-7654321-3,Class 5,A,5000,inactive\n",
            )
            .unwrap();

        let students = repo.list_students().unwrap();
        assert_eq!(students.len(), 3);
        assert_eq!(students[0].class_name, "Class 5");
        assert_eq!(students[1].name, "Bilal Khan");
        assert_eq!(students[1].guardian_identity, "");
        assert_eq!(students[1].monthly_fee, "4200.50".parse::<Decimal>().unwrap());
        assert!(students[1].is_active());
        assert!(!students[2].is_active());
    }

    #[test]
    fn test_missing_file_is_empty_roster() {
        let (repo, _connection, _temp_dir) = setup_test_repo();
        assert!(repo.list_students().unwrap().is_empty());
        assert!(repo.get_student("STU-001").unwrap().is_none());
    }

    #[test]
    fn test_store_student_upserts() {
        let (repo, _connection, _temp_dir) = setup_test_repo();
        let mut student = Student {
            id: "STU-009".to_string(),
            name: "Hamza".to_string(),
            guardian_identity: "42101-0000000-9".to_string(),
            class_name: "Class 1".to_string(),
            section: "C".to_string(),
            monthly_fee: Decimal::from(3000),
            status: StudentStatus::Active,
        };
        repo.store_student(&student).unwrap();
        student.class_name = "Class 2".to_string();
        repo.store_student(&student).unwrap();

        let students = repo.list_students().unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].class_name, "Class 2");
    }

    #[test]
    fn test_bad_fee_is_an_error() {
        let (repo, connection, _temp_dir) = setup_test_repo();
        connection
            .write_atomically(
                STUDENTS_FILE,
                "id,name,guardian_identity,class,section,monthly_fee,status\nS1,A,,Class 1,A,lots,active\n",
            )
            .unwrap();
        assert!(repo.list_students().is_err());
    }
}
