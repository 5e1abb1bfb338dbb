//! Fixtures shared by the crate's unit tests.

use chrono::{DateTime, TimeZone, Utc};
use fuelbook_core::{
    Bank, BankDepositInput, Counterparty, CounterpartyKind, CreditInput, DayKey, ExpenseInput,
    MeterReadingInput, Money, Nozzle, PaymentInput, RequestContext, Role, SaleInput, Stock, Tank,
    Volume,
};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};

/// A timestamp in January 2024, UTC.
pub fn at(day_of_month: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day_of_month, hour, 0, 0).unwrap()
}

pub fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

/// An all-cash sale.
pub fn sale_input(date: DateTime<Utc>, cash: i64) -> SaleInput {
    SaleInput {
        date,
        cash_payment: Money::from_paise(cash),
        atm_payment: Money::zero(),
        paytm_payment: Money::zero(),
        fleet_payment: Money::zero(),
        fuel_totals: vec![],
        rate: Money::from_paise(cash),
    }
}

pub fn expense_input(date: DateTime<Utc>, amount: i64, bank_id: Option<&str>) -> ExpenseInput {
    ExpenseInput {
        date,
        amount: Money::from_paise(amount),
        bank_id: bank_id.map(str::to_string),
        description: Some("generator diesel".into()),
    }
}

pub fn payment_input(
    counterparty_id: &str,
    kind: CounterpartyKind,
    paid_on: DateTime<Utc>,
    amount: i64,
) -> PaymentInput {
    PaymentInput {
        counterparty_id: counterparty_id.to_string(),
        counterparty_kind: kind,
        amount: Money::from_paise(amount),
        paid_on,
        note: None,
    }
}

pub fn deposit_input(bank_id: &str, date: DateTime<Utc>, amount: i64) -> BankDepositInput {
    BankDepositInput {
        bank_id: bank_id.to_string(),
        date,
        amount: Money::from_paise(amount),
        reference: None,
    }
}

pub fn credit_input(customer_id: &str, date: DateTime<Utc>, amount: i64) -> CreditInput {
    CreditInput {
        customer_id: customer_id.to_string(),
        date,
        amount: Money::from_paise(amount),
        description: None,
    }
}

/// A reading line moving a nozzle from `opening` to `closing` millilitres.
pub fn reading_input(
    nozzle: &Nozzle,
    date: DateTime<Utc>,
    opening: i64,
    closing: i64,
) -> MeterReadingInput {
    MeterReadingInput {
        nozzle_id: nozzle.id.clone(),
        fuel_type: nozzle.fuel_type.clone(),
        sale: Volume::from_ml(closing - opening),
        fuel_rate: Some(Money::from_rupees(100)),
        total_amount: Money::from_paise((closing - opening) / 10),
        opening_reading: Volume::from_ml(opening),
        closing_reading: Volume::from_ml(closing),
        date,
    }
}

/// A fresh in-memory database and a manager of one branch.
pub struct TestBranch {
    pub db: Database,
    pub branch_id: String,
    pub ctx: RequestContext,
}

impl TestBranch {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let branch_id = Uuid::new_v4().to_string();
        let ctx = RequestContext::new("manager-1", branch_id.clone(), Role::Manager);
        TestBranch { db, branch_id, ctx }
    }

    /// The day's net cash movement, zero when no row exists.
    pub async fn receipt(&self, day: DayKey) -> Money {
        self.db
            .balance_receipts()
            .amount(&self.branch_id, day)
            .await
            .unwrap()
    }

    pub async fn bank(&self, balance: i64) -> String {
        let now = Utc::now();
        let bank = Bank {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            name: format!("Bank {}", &Uuid::new_v4().to_string()[..8]),
            balance_amount: Money::from_paise(balance),
            created_at: now,
            updated_at: now,
        };
        self.db.banks().insert(&bank).await.unwrap();
        bank.id
    }

    pub async fn bank_balance(&self, id: &str) -> Money {
        self.db
            .banks()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .balance_amount
    }

    pub async fn counterparty(&self, kind: CounterpartyKind, outstanding: i64) -> String {
        let now = Utc::now();
        let party = Counterparty {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            kind,
            name: format!("{kind} {}", &Uuid::new_v4().to_string()[..8]),
            outstanding_payments: Money::from_paise(outstanding),
            created_at: now,
            updated_at: now,
        };
        self.db.counterparties().insert(&party).await.unwrap();
        party.id
    }

    pub async fn outstanding(&self, id: &str) -> Money {
        self.db
            .counterparties()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .outstanding_payments
    }

    pub async fn tank(&self, fuel_type: &str, capacity_ml: i64, level_ml: i64) -> Tank {
        let tank = Tank {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            fuel_type: fuel_type.to_string(),
            capacity: Volume::from_ml(capacity_ml),
            current_level: Volume::from_ml(level_ml),
            updated_at: Utc::now(),
        };
        self.db.fuel().insert_tank(&tank).await.unwrap();
        tank
    }

    pub async fn stock(&self, item: &str, quantity_ml: i64) -> Stock {
        let stock = Stock {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            item: item.to_string(),
            quantity: Volume::from_ml(quantity_ml),
            updated_at: Utc::now(),
        };
        self.db.fuel().insert_stock(&stock).await.unwrap();
        stock
    }

    pub async fn nozzle(&self, fuel_type: &str, opening_ml: i64) -> Nozzle {
        let nozzle = Nozzle {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            machine_id: "machine-1".to_string(),
            fuel_type: fuel_type.to_string(),
            opening_reading: Volume::from_ml(opening_ml),
            updated_at: Utc::now(),
        };
        self.db.fuel().insert_nozzle(&nozzle).await.unwrap();
        nozzle
    }
}
