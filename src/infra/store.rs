use std::path::PathBuf;

use color_eyre::eyre::Result;
use heed::{types::*, Database, Env, EnvOpenOptions};

use crate::{config::get_data_dir, domain::ledger::NonceLedger};

/// Database holding process-wide singleton values, keyed by name.
const GLOBALS_DB: &str = "globals";
const LEDGER_KEY: &str = "nonce_ledger";

/// Wrapper around LMDB database for persistent storage.
#[derive(Clone)]
pub struct Store {
    env: Env,
}

impl Store {
    pub fn new() -> Result<Self> {
        Self::with_path(get_data_dir().join("nonce-ledger.mdb"))
    }

    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(10 * 1024 * 1024) // 10MB
                .max_dbs(10)
                .open(path)?
        };
        Ok(Self { env })
    }

    /// Fetch the persisted ledger, defaulting to empty when none was saved.
    pub fn load_ledger(&self) -> Result<NonceLedger> {
        let rtxn = self.env.read_txn()?;
        let db: Option<Database<Str, SerdeRmp<NonceLedger>>> =
            self.env.open_database(&rtxn, Some(GLOBALS_DB))?;

        match db {
            Some(db) => Ok(db.get(&rtxn, LEDGER_KEY)?.unwrap_or_default()),
            None => Ok(NonceLedger::default()),
        }
    }

    /// Save the ledger, replacing any previously persisted value.
    pub fn save_ledger(&self, ledger: &NonceLedger) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db: Database<Str, SerdeRmp<NonceLedger>> =
            self.env.create_database(&mut wtxn, Some(GLOBALS_DB))?;
        db.put(&mut wtxn, LEDGER_KEY, ledger)?;
        wtxn.commit()?;
        Ok(())
    }
}
