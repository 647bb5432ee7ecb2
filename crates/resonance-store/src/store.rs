use std::path::Path;

use primitive_types::U256;
use rusqlite::{Connection, OptionalExtension, params};

use resonance_core::snapshot::{OracleEntry, SlotEntry};
use resonance_core::{
    Address, CURRENT_VERSION, Event, EventRecord, ResonanceEngine, Roles, Snapshot,
};

use crate::error::{Result, StoreError};
use crate::schema;

/// One value transfer the host carried out on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTransfer {
    pub id: i64,
    pub block_number: u64,
    pub recipient: Address,
    pub amount: U256,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::info!(path = %path.display(), "engine store opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).optional()?;
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.set_metadata_on(&self.conn, key, value)
    }

    fn set_metadata_on(&self, conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn required_metadata(&self, key: &str) -> Result<String> {
        self.get_metadata(key)?
            .ok_or_else(|| StoreError::InvalidData(format!("missing metadata key '{key}'")))
    }

    fn metadata_u256(&self, key: &str) -> Result<U256> {
        parse_u256(&self.required_metadata(key)?)
    }

    fn metadata_u64(&self, key: &str) -> Result<u64> {
        let raw = self.required_metadata(key)?;
        raw.parse::<u64>()
            .map_err(|e| StoreError::InvalidData(format!("metadata '{key}' = '{raw}': {e}")))
    }

    // --- Save ---

    /// Rewrite the persisted state to match `engine` and append any event
    /// records with a sequence past the last one stored.
    pub fn save_engine(&self, engine: &ResonanceEngine) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.write_engine_on(&tx, engine)?;
        tx.commit()?;
        Ok(())
    }

    /// Like [`save_engine`](Self::save_engine) but discards the stored event
    /// log and transfer history first.
    pub fn replace_engine(&self, engine: &ResonanceEngine) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM events; DELETE FROM value_transfers;")?;
        self.write_engine_on(&tx, engine)?;
        tx.commit()?;
        tracing::info!("engine state replaced");
        Ok(())
    }

    fn write_engine_on(&self, conn: &Connection, engine: &ResonanceEngine) -> Result<()> {
        conn.execute_batch("DELETE FROM harmonic_slots; DELETE FROM oracle_results;")?;

        let roles = engine.roles();
        let state = engine.state();
        let entries = [
            ("snapshot_version", CURRENT_VERSION.to_string()),
            ("curator", roles.curator().to_string()),
            ("oracle", roles.oracle().to_string()),
            ("keeper", roles.keeper().to_string()),
            ("magnitude_bound", state.magnitude_bound.to_string()),
            ("current_phase", state.current_phase.to_string()),
            ("harmonic_slot_count", state.harmonic_slot_count.to_string()),
            ("oracle_call_count", state.oracle_call_count.to_string()),
            ("flux_count", state.flux_count.to_string()),
            ("forwarded_total", state.forwarded_total.to_string()),
            ("next_sequence", state.next_sequence.to_string()),
        ];
        for (key, value) in &entries {
            self.set_metadata_on(conn, key, value)?;
        }

        {
            let mut stmt =
                conn.prepare("INSERT INTO harmonic_slots (slot, value) VALUES (?1, ?2)")?;
            for (&slot, value) in &state.harmonic_slots {
                stmt.execute(params![to_sql_int(slot)?, value.to_string()])?;
            }
        }
        {
            let mut stmt =
                conn.prepare("INSERT INTO oracle_results (query_id, result) VALUES (?1, ?2)")?;
            for (query_id, result) in &state.oracle_results {
                stmt.execute(params![query_id.to_string(), result.to_string()])?;
            }
        }

        let persisted: Option<i64> =
            conn.query_row("SELECT MAX(sequence) FROM events", [], |row| row.get(0))?;
        let mut appended = 0usize;
        {
            let mut stmt = conn.prepare(
                "INSERT INTO events (sequence, block_number, kind, payload) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in engine.events() {
                let sequence = to_sql_int(record.sequence)?;
                if persisted.is_some_and(|max| sequence <= max) {
                    continue;
                }
                stmt.execute(params![
                    sequence,
                    to_sql_int(record.block_number)?,
                    record.event.kind(),
                    serde_json::to_string(&record.event)?,
                ])?;
                appended += 1;
            }
        }

        tracing::info!(
            slots = state.harmonic_slots.len(),
            oracle_results = state.oracle_results.len(),
            appended,
            "engine saved"
        );
        Ok(())
    }

    // --- Load ---

    /// `None` until an engine has been saved. The returned engine carries an
    /// empty in-memory event log; stored records stay in the `events` table.
    pub fn load_engine(&self) -> Result<Option<ResonanceEngine>> {
        let Some(curator) = self.get_metadata("curator")? else {
            return Ok(None);
        };
        let roles = Roles::new(
            parse_address(&curator)?,
            parse_address(&self.required_metadata("oracle")?)?,
            parse_address(&self.required_metadata("keeper")?)?,
        )?;

        let snapshot = Snapshot {
            version: self.required_metadata("snapshot_version")?,
            roles,
            magnitude_bound: self.metadata_u256("magnitude_bound")?,
            current_phase: self.metadata_u256("current_phase")?,
            harmonic_slot_count: self.metadata_u64("harmonic_slot_count")?,
            harmonic_slots: self.load_slots()?,
            oracle_results: self.load_oracle_results()?,
            oracle_call_count: self.metadata_u64("oracle_call_count")?,
            flux_count: self.metadata_u64("flux_count")?,
            forwarded_total: self.metadata_u256("forwarded_total")?,
            next_sequence: self.metadata_u64("next_sequence")?,
            events: Vec::new(),
        };
        Ok(Some(snapshot.restore()?))
    }

    fn load_slots(&self) -> Result<Vec<SlotEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slot, value FROM harmonic_slots ORDER BY slot")?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(slot, value)| {
                Ok(SlotEntry {
                    slot: from_sql_int(slot)?,
                    value: parse_u256(&value)?,
                })
            })
            .collect()
    }

    fn load_oracle_results(&self) -> Result<Vec<OracleEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT query_id, result FROM oracle_results")?;
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(query_id, result)| {
                Ok(OracleEntry {
                    query_id: parse_u256(&query_id)?,
                    result: parse_u256(&result)?,
                })
            })
            .collect()
    }

    // --- Event log ---

    pub fn event_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        from_sql_int(count)
    }

    /// The last `limit` records, oldest first.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<EventRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut records = self.query_events(
            "SELECT sequence, block_number, payload FROM events ORDER BY sequence DESC LIMIT ?1",
            params![limit],
        )?;
        records.reverse();
        Ok(records)
    }

    pub fn all_events(&self) -> Result<Vec<EventRecord>> {
        self.query_events(
            "SELECT sequence, block_number, payload FROM events ORDER BY sequence",
            params![],
        )
    }

    fn query_events(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<EventRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows: Vec<(i64, i64, String)> = stmt
            .query_map(args, |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(sequence, block_number, payload)| {
                let event: Event = serde_json::from_str(&payload)?;
                Ok(EventRecord {
                    sequence: from_sql_int(sequence)?,
                    block_number: from_sql_int(block_number)?,
                    event,
                })
            })
            .collect()
    }

    // --- Host bookkeeping ---

    /// Height of the last simulated block, 0 before any call.
    pub fn block_height(&self) -> Result<u64> {
        match self.get_metadata("block_height")? {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| StoreError::InvalidData(format!("block_height '{raw}': {e}"))),
            None => Ok(0),
        }
    }

    /// Advance the simulated chain by one block and return the new height.
    pub fn next_block(&self) -> Result<u64> {
        let next = self
            .block_height()?
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidData("block height exhausted".to_string()))?;
        self.set_metadata("block_height", &next.to_string())?;
        Ok(next)
    }

    pub fn record_transfer(
        &self,
        block_number: u64,
        recipient: Address,
        amount: U256,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO value_transfers (block_number, recipient, amount) VALUES (?1, ?2, ?3)",
            params![
                to_sql_int(block_number)?,
                recipient.to_string(),
                amount.to_string()
            ],
        )?;
        tracing::debug!(block_number, %recipient, %amount, "value transfer recorded");
        Ok(())
    }

    pub fn transfers(&self) -> Result<Vec<ValueTransfer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, block_number, recipient, amount FROM value_transfers ORDER BY id",
        )?;
        let rows: Vec<(i64, i64, String, String)> = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(id, block_number, recipient, amount)| {
                Ok(ValueTransfer {
                    id,
                    block_number: from_sql_int(block_number)?,
                    recipient: parse_address(&recipient)?,
                    amount: parse_u256(&amount)?,
                })
            })
            .collect()
    }

    // --- Indexed lookups ---

    /// Stored slot value, zero when unset.
    pub fn harmonic(&self, slot: u64) -> Result<U256> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM harmonic_slots WHERE slot = ?1",
                [to_sql_int(slot)?],
                |row| row.get(0),
            )
            .optional()?;
        raw.map_or(Ok(U256::zero()), |v| parse_u256(&v))
    }

    /// Last result recorded for `query_id`, zero when never answered.
    pub fn oracle_result(&self, query_id: U256) -> Result<U256> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT result FROM oracle_results WHERE query_id = ?1",
                [query_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        raw.map_or(Ok(U256::zero()), |v| parse_u256(&v))
    }
}

fn parse_u256(s: &str) -> Result<U256> {
    U256::from_dec_str(s)
        .map_err(|e| StoreError::InvalidData(format!("invalid number '{s}': {e:?}")))
}

fn parse_address(s: &str) -> Result<Address> {
    s.parse::<Address>()
        .map_err(|e| StoreError::InvalidData(format!("invalid identity '{s}': {e}")))
}

fn to_sql_int(v: u64) -> Result<i64> {
    i64::try_from(v)
        .map_err(|_| StoreError::InvalidData(format!("{v} does not fit an INTEGER column")))
}

fn from_sql_int(v: i64) -> Result<u64> {
    u64::try_from(v).map_err(|_| StoreError::InvalidData(format!("negative counter {v}")))
}
