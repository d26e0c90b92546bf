use super::file::BoardSnapshot;
use super::{BoardStore, PersistenceError, PersistenceResult};
use crate::ChoreBoard;
use crate::config::BoardConfig;
use crate::history::ScheduleHistory;
use crate::schedule::MonthlySchedule;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteBoardStore {
    connection: Mutex<Connection>,
}

impl SqliteBoardStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS board_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config_json TEXT NOT NULL,
                month_offset INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS frozen_months (
                month INTEGER PRIMARY KEY,
                schedule_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_config(
        &self,
        tx: &rusqlite::Transaction,
        config: &BoardConfig,
        month_offset: i64,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(config)?;
        tx.execute("DELETE FROM board_config", [])?;
        tx.execute(
            "INSERT INTO board_config (id, config_json, month_offset) VALUES (1, ?1, ?2)",
            params![json, month_offset],
        )?;
        Ok(())
    }

    fn save_history(
        &self,
        tx: &rusqlite::Transaction,
        history: &ScheduleHistory,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM frozen_months", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO frozen_months (month, schedule_json) VALUES (?1, ?2)")?;
        for schedule in history.iter() {
            let json = serde_json::to_string(schedule)?;
            stmt.execute(params![schedule.month_seed, json])?;
        }
        Ok(())
    }
}

impl BoardStore for SqliteBoardStore {
    fn save_board(&self, board: &ChoreBoard) -> PersistenceResult<()> {
        super::validate_history(board.history())?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_config(&tx, &board.config(), board.month_offset())?;
        self.save_history(&tx, board.history())?;
        tx.commit()?;
        Ok(())
    }

    fn load_board(&self) -> PersistenceResult<Option<ChoreBoard>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT config_json, month_offset FROM board_config WHERE id = 1")?;
        let row: Option<(String, i64)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((config_json, month_offset)) = row else {
            return Ok(None);
        };

        let config: BoardConfig = serde_json::from_str(&config_json)?;

        let mut stmt =
            conn.prepare("SELECT month, schedule_json FROM frozen_months ORDER BY month ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut history = ScheduleHistory::new();
        for row in rows {
            let (month, json) = row?;
            let schedule: MonthlySchedule = serde_json::from_str(&json)?;
            if schedule.month_seed != month {
                return Err(PersistenceError::InvalidData(format!(
                    "row for month {month} holds the schedule of month {}",
                    schedule.month_seed
                )));
            }
            history.freeze(schedule);
        }

        let snapshot = BoardSnapshot {
            config,
            month_offset,
            history,
        };
        snapshot.into_board().map(Some)
    }
}
