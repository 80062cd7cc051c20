pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS habits (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    life_significance TEXT,
    icon TEXT NOT NULL,
    color TEXT NOT NULL,
    frequency TEXT NOT NULL,
    custom_days TEXT,
    habit_type TEXT NOT NULL DEFAULT 'positive',
    daily_target INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    archived INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS completions (
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    status TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    PRIMARY KEY (habit_id, date)
);

CREATE TABLE IF NOT EXISTS coping_steps (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    sort_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS urge_logs (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    completed_steps TEXT NOT NULL DEFAULT '[]',
    all_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rocket_ledger (
    habit_id TEXT PRIMARY KEY REFERENCES habits(id) ON DELETE CASCADE,
    rockets INTEGER NOT NULL DEFAULT 0,
    next_in INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    theme TEXT NOT NULL,
    locale TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_completions_date ON completions(date);
CREATE INDEX IF NOT EXISTS idx_coping_steps_habit ON coping_steps(habit_id, sort_order);
CREATE INDEX IF NOT EXISTS idx_urge_logs_date ON urge_logs(date, habit_id);
";
