//! Seeding of the reference data and randomly generated sample transactions,
//! used by the `load_initial_data` and `load_test_transactions` binaries.

use std::fmt::Display;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::{Date, Duration};

use crate::{
    Amount, EntryKind, EntryName, Error,
    dictionary::{
        Category, CategoryRepository, Status, StatusRepository, Subcategory,
        SubcategoryRepository, TransactionType, TransactionTypeRepository,
    },
    transaction::{Transaction, TransactionFilter, TransactionListing, TransactionRepository},
};

/// The name of the transaction type for money coming in.
pub const INCOME: &str = "Income";
/// The name of the transaction type for money going out.
pub const EXPENSE: &str = "Expense";

const STATUSES: [&str; 3] = ["Business", "Personal", "Tax"];

/// Transaction type > category > subcategories.
const TAXONOMY: [(&str, &str, [&str; 2]); 4] = [
    (EXPENSE, "Infrastructure", ["VPS", "Proxy"]),
    (EXPENSE, "Marketing", ["Farpost", "Avito"]),
    (INCOME, "Salary", ["Main job", "Side job"]),
    (INCOME, "Business income", ["Sales", "Services"]),
];

const INCOME_COMMENTS: [&str; 5] = [
    "Monthly salary",
    "Advance payment",
    "Bonus",
    "Project payment",
    "Freelance work",
];

const EXPENSE_COMMENTS: [&str; 5] = [
    "VPS server payment",
    "Avito promotion",
    "Proxy purchase",
    "Farpost advertising",
    "Maintenance",
];

/// The furthest back a sample transaction may be dated, in days before today.
const MAX_DAYS_AGO: i64 = 30;

/// A dictionary entry created while loading the reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEntry {
    /// What kind of entry was created.
    pub kind: EntryKind,
    /// The name of the entry, followed by its parent's name for categories and
    /// subcategories.
    pub label: String,
}

impl Display for CreatedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Created {}: {}", self.kind, self.label)
    }
}

/// What [load_initial_data] added to the database.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitialDataReport {
    /// The entries that did not exist before, in the order they were created.
    pub created: Vec<CreatedEntry>,
}

/// Create the default statuses, transaction types, categories and
/// subcategories.
///
/// Entries that already exist are left alone, so running this more than once
/// is safe. Everything is written in a single database transaction.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn load_initial_data(connection: &Connection) -> Result<InitialDataReport, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let mut report = InitialDataReport::default();

    let statuses = StatusRepository::new(&transaction);
    for name in STATUSES {
        let (status, created) = statuses.get_or_create(EntryName::new_unchecked(name))?;
        if created {
            report.record(EntryKind::Status, status.name.to_string());
        }
    }

    let transaction_types = TransactionTypeRepository::new(&transaction);
    let categories = CategoryRepository::new(&transaction);
    let subcategories = SubcategoryRepository::new(&transaction);

    for type_name in [INCOME, EXPENSE] {
        let (transaction_type, created) =
            transaction_types.get_or_create(EntryName::new_unchecked(type_name))?;
        if created {
            report.record(EntryKind::TransactionType, transaction_type.name.to_string());
        }
    }

    for (type_name, category_name, subcategory_names) in TAXONOMY {
        let (transaction_type, _) =
            transaction_types.get_or_create(EntryName::new_unchecked(type_name))?;
        let (category, created) = categories
            .get_or_create(EntryName::new_unchecked(category_name), transaction_type.id)?;
        if created {
            report.record(
                EntryKind::Category,
                format!("{} ({})", category.name, transaction_type.name),
            );
        }

        for subcategory_name in subcategory_names {
            let (subcategory, created) = subcategories
                .get_or_create(EntryName::new_unchecked(subcategory_name), category.id)?;
            if created {
                report.record(
                    EntryKind::Subcategory,
                    format!("{} ({})", subcategory.name, category.name),
                );
            }
        }
    }

    transaction.commit()?;

    Ok(report)
}

impl InitialDataReport {
    fn record(&mut self, kind: EntryKind, label: String) {
        tracing::debug!("created {kind} {label}");
        self.created.push(CreatedEntry { kind, label });
    }
}

/// What [load_test_transactions] added to the database.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestTransactionsReport {
    /// The generated transactions, in the order they were created.
    pub created: Vec<TransactionListing>,
    /// The number of transactions in the database afterwards.
    pub total_count: u64,
    /// The number of income transactions in the database afterwards.
    pub income_count: u64,
    /// The number of expense transactions in the database afterwards.
    pub expense_count: u64,
}

/// The choices for generating transactions of one transaction type.
struct SamplePlan {
    transaction_type: TransactionType,
    branches: Vec<(Category, Vec<Subcategory>)>,
    amounts: (i64, i64),
    comments: &'static [&'static str],
}

impl SamplePlan {
    fn load(
        connection: &Connection,
        transaction_type: TransactionType,
        amounts: (i64, i64),
        comments: &'static [&'static str],
    ) -> Result<Self, Error> {
        let categories =
            CategoryRepository::new(connection).for_transaction_type(transaction_type.id)?;
        if categories.is_empty() {
            return Err(Error::MissingReferenceData(EntryKind::Category));
        }

        let subcategory_repository = SubcategoryRepository::new(connection);
        let mut branches = Vec::with_capacity(categories.len());
        for category in categories {
            let subcategories = subcategory_repository.for_category(category.id)?;
            if !subcategories.is_empty() {
                branches.push((category, subcategories));
            }
        }

        if branches.is_empty() {
            return Err(Error::MissingReferenceData(EntryKind::Subcategory));
        }

        Ok(Self {
            transaction_type,
            branches,
            amounts,
            comments,
        })
    }
}

fn find_transaction_type(
    transaction_types: &[TransactionType],
    name: &str,
) -> Result<TransactionType, Error> {
    transaction_types
        .iter()
        .find(|transaction_type| transaction_type.name.as_ref() == name)
        .cloned()
        .ok_or(Error::MissingReferenceData(EntryKind::TransactionType))
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Generate `count` random transactions using the existing reference data.
///
/// Each transaction is an income or an expense with equal chance. Income
/// amounts are whole numbers from 15,000 to 80,000 and expense amounts are
/// whole numbers from 500 to 15,000. Dates fall between `today` and 30 days
/// before it. Passing a `seed` makes the output reproducible.
///
/// # Errors
/// Returns an [Error::MissingReferenceData] if there are no statuses, if
/// either the "Income" or "Expense" transaction type is missing, or if a
/// transaction type has no category with subcategories. Returns an
/// [Error::SqlError] if there is an SQL error.
pub fn load_test_transactions(
    connection: &Connection,
    count: usize,
    seed: Option<u64>,
    today: Date,
) -> Result<TestTransactionsReport, Error> {
    let statuses: Vec<Status> = StatusRepository::new(connection).get_all()?;
    if statuses.is_empty() {
        return Err(Error::MissingReferenceData(EntryKind::Status));
    }

    let transaction_types = TransactionTypeRepository::new(connection).get_all()?;
    let income_type = find_transaction_type(&transaction_types, INCOME)?;
    let expense_type = find_transaction_type(&transaction_types, EXPENSE)?;

    let plans = [
        SamplePlan::load(connection, income_type, (15_000, 80_000), &INCOME_COMMENTS)?,
        SamplePlan::load(connection, expense_type, (500, 15_000), &EXPENSE_COMMENTS)?,
    ];

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let repository = TransactionRepository::new(&transaction);
    let mut created = Vec::with_capacity(count);

    for _ in 0..count {
        let plan = pick(&mut rng, &plans);
        let (category, subcategories) = pick(&mut rng, &plan.branches);
        let subcategory = pick(&mut rng, subcategories);
        let status = pick(&mut rng, &statuses);

        let (min_amount, max_amount) = plan.amounts;
        let amount = Amount::new(Decimal::from(rng.random_range(min_amount..=max_amount)))?;
        let date = today.saturating_sub(Duration::days(rng.random_range(0..=MAX_DAYS_AGO)));
        let comment = pick(&mut rng, plan.comments);

        let new_transaction = repository.create(
            Transaction::build(
                date,
                status.id,
                plan.transaction_type.id,
                category.id,
                subcategory.id,
                amount,
            )
            .comment(comment),
        )?;
        created.push(repository.get_listing(new_transaction.id)?);
    }

    let count_type = |transaction_type: &TransactionType| {
        repository.count_filtered(&TransactionFilter {
            transaction_type_id: Some(transaction_type.id),
            ..Default::default()
        })
    };
    let report = TestTransactionsReport {
        created,
        total_count: repository.count()?,
        income_count: count_type(&plans[0].transaction_type)?,
        expense_count: count_type(&plans[1].transaction_type)?,
    };

    transaction.commit()?;

    Ok(report)
}
