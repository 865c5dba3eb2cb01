// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af tui` - a full interactive dashboard widget is out of scope for
//! this kernel (the CLI/TUI is a thin client of the RPC surface); this
//! renders the same `status.full` snapshot on a refresh interval.

use std::time::Duration;

use crate::client::RpcClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

pub async fn tui(client: &RpcClient) -> Result<(), ExitError> {
    loop {
        print!("\x1B[2J\x1B[H"); // clear screen, move cursor home
        crate::commands::status::status(client, None, false, REFRESH_INTERVAL, OutputFormat::Text).await?;
        tokio::time::sleep(REFRESH_INTERVAL).await;
    }
}
