// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj projects` — registered projects.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let projects = client.list_projects().await?;
    output::print_projects(format, &projects)
}
