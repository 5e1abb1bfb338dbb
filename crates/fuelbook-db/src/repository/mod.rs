//! # Repository Module
//!
//! Table-level access for the back office.
//!
//! ## Two Layers Per Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  XRepository { pool }          pub, read-only helpers for callers       │
//! │  ├── get_by_id(id)             outside a unit of work (API, tests)     │
//! │  └── list_for_day(branch, day)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fn find_by_id(conn, id)       pub(crate), run on any connection,      │
//! │  fn tx_insert(conn, x)         including an open transaction, so the   │
//! │  fn tx_update(conn, x)         ledger can put an entity write and its  │
//! │  fn tx_delete(conn, id)        balance adjustments in one commit       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BalanceReceiptRepository`] - Per-branch, per-day cash ledger rows
//! - [`BankRepository`] - Bank accounts and balances
//! - [`CounterpartyRepository`] - Customers and suppliers
//! - [`SaleRepository`], [`ExpenseRepository`], [`PaymentRepository`],
//!   [`BankDepositRepository`], [`CreditRepository`] - Ledger entities
//! - [`FuelRepository`] - Nozzles, tanks, stocks and meter readings

pub mod balance_receipt;
pub mod bank;
pub mod bank_deposit;
pub mod counterparty;
pub mod credit;
pub mod expense;
pub mod fuel;
pub mod payment;
pub mod sale;

pub use balance_receipt::BalanceReceiptRepository;
pub use bank::BankRepository;
pub use bank_deposit::BankDepositRepository;
pub use counterparty::CounterpartyRepository;
pub use credit::CreditRepository;
pub use expense::ExpenseRepository;
pub use fuel::FuelRepository;
pub use payment::PaymentRepository;
pub use sale::SaleRepository;
