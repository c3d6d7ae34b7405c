//! Table definitions for the CRM store.

pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT,
        mobile_no TEXT,
        role TEXT NOT NULL DEFAULT 'employee',
        status TEXT NOT NULL DEFAULT 'active',
        password TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS leads (
        id TEXT PRIMARY KEY,
        inquiry_no TEXT,
        inquiry_date TEXT,
        client_company TEXT,
        contact_person TEXT,
        contact_no TEXT,
        email TEXT,
        designation TEXT,
        department TEXT,
        description TEXT,
        type_of_place TEXT,
        space_requirement TEXT,
        transaction_type TEXT,
        budget REAL,
        city TEXT,
        location_preference TEXT,
        site_visit_required TEXT NOT NULL DEFAULT 'No',
        proposal_submitted TEXT NOT NULL DEFAULT 'No',
        shortlisted TEXT NOT NULL DEFAULT 'No',
        deal_closed TEXT NOT NULL DEFAULT 'No',
        owner_id TEXT,
        assignee_id TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_leads_owner ON leads (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_leads_assignee ON leads (assignee_id)",
    r#"CREATE TABLE IF NOT EXISTS pending_actions (
        id TEXT PRIMARY KEY,
        module TEXT NOT NULL,
        type TEXT NOT NULL,
        data TEXT,
        target_id TEXT,
        requested_by TEXT,
        requested_by_name TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        admin_notes TEXT,
        approved_by TEXT,
        approved_by_name TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        entity TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        label TEXT,
        filename TEXT,
        content_type TEXT,
        file_size INTEGER,
        r2_key TEXT,
        public_url TEXT,
        uploaded_by TEXT,
        uploaded_by_name TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_documents_entity ON documents (entity, entity_id)",
];
