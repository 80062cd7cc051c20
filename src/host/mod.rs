//! Framed JSON request/response host.
//!
//! Each message is a 4-byte little-endian length followed by that many bytes
//! of JSON. Requests and responses are tagged by a `type` field.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::constants::MAX_MESSAGE_SIZE;
use crate::error::AppError;
use crate::models::{
    AppSettings, Completion, CompletionStatus, CopingStep, Habit, Locale, RocketBalance,
    SettingsUpdate, Theme, UrgeLog,
};
use crate::service::{HabitPatch, HabitService, NewHabit};
use crate::snapshot::{ImportSummary, Snapshot};
use crate::stats::{HabitWithStats, OverviewStats};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    ListHabits,
    GetHabit { id: String },
    AddHabit { habit: NewHabit },
    UpdateHabit { id: String, patch: HabitPatch },
    ArchiveHabit { id: String, archived: bool },
    DeleteHabit { id: String },
    CopingSteps { habit_id: String },
    ListCompletions,
    ToggleCompletion { habit_id: String },
    SetCompletionStatus { habit_id: String, date: String, status: CompletionStatus },
    ClearCompletion { habit_id: String, date: String },
    StartUrge { habit_id: String },
    CompleteUrgeStep { log_id: String, step_id: String },
    TodayUrgeLogs,
    UseRocket { habit_id: String, date: String },
    SetRocketBalance { habit_id: String, rockets: u32, next_in: u32 },
    HabitsWithStats,
    TodayHabits,
    Overview,
    GetSettings,
    UpdateSettings { theme: Option<Theme>, locale: Option<Locale> },
    ExportSnapshot,
    ImportSnapshot { snapshot: Snapshot },
    ExportToFile { path: PathBuf },
    ImportFromFile { path: PathBuf },
    Reset,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Response {
    Habits { habits: Vec<Habit> },
    Habit { habit: Habit },
    CopingSteps { steps: Vec<CopingStep> },
    Completions { completions: Vec<Completion> },
    /// `None` when a toggle removed today's record.
    Completion { completion: Option<Completion> },
    Cleared { existed: bool },
    UrgeLog { log: UrgeLog },
    UrgeLogs { logs: Vec<UrgeLog> },
    HabitStats { habits: Vec<HabitWithStats> },
    Overview { stats: OverviewStats },
    Settings { settings: AppSettings },
    Snapshot { snapshot: Snapshot },
    Imported { summary: ImportSummary },
    Ok,
    Error { message: String },
}

impl Response {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

fn reply<T>(result: Result<T, AppError>, into: impl FnOnce(T) -> Response) -> Response {
    match result {
        Ok(value) => into(value),
        Err(e) => {
            warn!("Request failed: {e}");
            Response::error(e)
        }
    }
}

pub struct Host<R, W> {
    service: HabitService,
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> Host<R, W> {
    pub fn new(service: HabitService, reader: R, writer: W) -> Self {
        Self {
            service,
            reader,
            writer,
        }
    }

    /// Serve requests until the reader is exhausted. A malformed request gets
    /// an error response; only I/O failures and oversized frames stop the loop.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(frame) = self.read_message()? {
            let response = match serde_json::from_slice::<Request>(&frame) {
                Ok(request) => {
                    debug!("Handling request: {request:?}");
                    self.handle(request)
                }
                Err(e) => {
                    warn!("Rejecting malformed request: {e}");
                    Response::error(format!("Invalid request: {e}"))
                }
            };
            self.write_message(&response)?;
        }
        debug!("Input closed, host stopping");
        Ok(())
    }

    /// Read one frame. Returns `None` when the input ends before a new frame.
    /// Input that ends inside the length header or the body is `UnexpectedEof`.
    fn read_message(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut first = [0u8; 1];
        loop {
            match self.reader.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        let mut rest = [0u8; 3];
        self.reader.read_exact(&mut rest)?;

        let [b0] = first;
        let [b1, b2, b3] = rest;
        let len = usize::try_from(u32::from_le_bytes([b0, b1, b2, b3]))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if len > MAX_MESSAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
            ));
        }

        let mut buffer = vec![0u8; len];
        self.reader.read_exact(&mut buffer)?;
        Ok(Some(buffer))
    }

    fn write_message(&mut self, response: &Response) -> io::Result<()> {
        let mut json = serde_json::to_vec(response)?;
        if json.len() > MAX_MESSAGE_SIZE {
            warn!("Response of {} bytes exceeds the frame limit", json.len());
            json = serde_json::to_vec(&Response::error("Response too large"))?;
        }
        let len = u32::try_from(json.len())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&json)?;
        self.writer.flush()
    }

    pub fn handle(&self, request: Request) -> Response {
        let service = &self.service;
        match request {
            Request::ListHabits => reply(service.list_habits(), |habits| Response::Habits { habits }),
            Request::GetHabit { id } => reply(service.get_habit(&id), |habit| Response::Habit { habit }),
            Request::AddHabit { habit } => {
                reply(service.add_habit(&habit), |habit| Response::Habit { habit })
            }
            Request::UpdateHabit { id, patch } => {
                reply(service.update_habit(&id, &patch), |habit| Response::Habit { habit })
            }
            Request::ArchiveHabit { id, archived } => {
                reply(service.archive_habit(&id, archived), |()| Response::Ok)
            }
            Request::DeleteHabit { id } => reply(service.delete_habit(&id), |()| Response::Ok),
            Request::CopingSteps { habit_id } => {
                reply(service.coping_steps(&habit_id), |steps| Response::CopingSteps { steps })
            }
            Request::ListCompletions => reply(service.completions(), |completions| {
                Response::Completions { completions }
            }),
            Request::ToggleCompletion { habit_id } => {
                reply(service.toggle_completion(&habit_id), |completion| {
                    Response::Completion { completion }
                })
            }
            Request::SetCompletionStatus {
                habit_id,
                date,
                status,
            } => reply(service.set_completion_status(&habit_id, &date, status), |c| {
                Response::Completion { completion: Some(c) }
            }),
            Request::ClearCompletion { habit_id, date } => {
                reply(service.clear_completion(&habit_id, &date), |existed| {
                    Response::Cleared { existed }
                })
            }
            Request::StartUrge { habit_id } => {
                reply(service.start_urge(&habit_id), |log| Response::UrgeLog { log })
            }
            Request::CompleteUrgeStep { log_id, step_id } => {
                reply(service.complete_urge_step(&log_id, &step_id), |log| {
                    Response::UrgeLog { log }
                })
            }
            Request::TodayUrgeLogs => reply(service.today_urge_logs(), |logs| Response::UrgeLogs { logs }),
            Request::UseRocket { habit_id, date } => {
                reply(service.use_rocket(&habit_id, &date), |c| Response::Completion {
                    completion: Some(c),
                })
            }
            Request::SetRocketBalance {
                habit_id,
                rockets,
                next_in,
            } => reply(
                service.set_rocket_balance(&habit_id, RocketBalance { rockets, next_in }),
                |()| Response::Ok,
            ),
            Request::HabitsWithStats => {
                reply(service.habits_with_stats(), |habits| Response::HabitStats { habits })
            }
            Request::TodayHabits => {
                reply(service.today_habits(), |habits| Response::HabitStats { habits })
            }
            Request::Overview => reply(service.overview(), |stats| Response::Overview { stats }),
            Request::GetSettings => {
                reply(service.settings(), |settings| Response::Settings { settings })
            }
            Request::UpdateSettings { theme, locale } => reply(
                service.update_settings(SettingsUpdate { theme, locale }),
                |settings| Response::Settings { settings },
            ),
            Request::ExportSnapshot => {
                reply(service.export_snapshot(), |snapshot| Response::Snapshot { snapshot })
            }
            Request::ImportSnapshot { snapshot } => {
                reply(service.import_snapshot(&snapshot), |summary| Response::Imported { summary })
            }
            Request::ExportToFile { path } => {
                reply(service.export_to_file(&path), |snapshot| Response::Snapshot { snapshot })
            }
            Request::ImportFromFile { path } => {
                reply(service.import_from_file(&path), |summary| Response::Imported { summary })
            }
            Request::Reset => reply(service.reset(), |()| Response::Ok),
        }
    }
}
