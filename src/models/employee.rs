//! Employee identity model.

use serde::{Deserialize, Serialize};

/// Identifying details of the employee a timesheet belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInfo {
    /// Unique identifier for the employee within a processing run.
    pub employee_id: String,
    /// Full name as printed on the salary slip.
    pub name: String,
    /// Department the employee belongs to.
    pub department: String,
    /// Job title.
    pub designation: String,
    /// Contact e-mail address.
    pub email: String,
    /// Account the net salary is paid into.
    pub bank_account: String,
}

impl EmployeeInfo {
    /// Returns the name with whitespace runs collapsed to `_` and anything
    /// other than ASCII letters, digits, `-` and `_` removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::models::EmployeeInfo;
    ///
    /// let employee = EmployeeInfo {
    ///     employee_id: "EMP001".to_string(),
    ///     name: "  Mary-Jane  O'Neil ".to_string(),
    ///     department: "Engineering".to_string(),
    ///     designation: "Engineer".to_string(),
    ///     email: "mj@example.com".to_string(),
    ///     bank_account: "1234567890".to_string(),
    /// };
    /// assert_eq!(employee.sanitized_name(), "Mary-Jane_ONeil");
    /// ```
    pub fn sanitized_name(&self) -> String {
        sanitize_component(&self.name)
    }

    /// The employee id made safe for use as a file name component.
    pub fn sanitized_id(&self) -> String {
        sanitize_component(&self.employee_id)
    }
}

fn sanitize_component(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
