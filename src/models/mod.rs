//! Core data models for the salary engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod calendar;
mod employee;
mod payment;
mod period;
mod salary_record;
mod shift;

pub use attendance::{AttendanceInput, NormalizedAttendanceDay, PunchMap};
pub use calendar::{Holiday, HolidayCalendar, HolidayCategory, HolidayTag};
pub use employee::{
    EmployeeSalaryInput, HolidayPolicy, Inherited, Nominee, OtMethod, PayDivisor,
    SimulationProbabilities,
};
pub use payment::{
    AmountSpec, EPF_LINE_ITEM, PaymentLineItem, PaymentStructure, ResolvedLineItem,
    ResolvedPaymentStructure,
};
pub use period::Period;
pub use salary_record::{AmountWithReason, SalaryRecord};
pub use shift::{DayKind, ExpectedWindow, ShiftDefinition, WorkingDayPolicy};
