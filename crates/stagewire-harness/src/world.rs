//! A client and server connected in memory.

use stagewire_client::{Client, ClientOptions};
use stagewire_server::{Server, ServerOptions};
use tracing::trace;

use crate::{EventLog, HarnessError, MemoryInbox, MemoryTransport, channel};

/// One client talking to one server.
///
/// Each side records what its callback saw. Frames queue until
/// [`settle`](Self::settle) delivers them.
pub struct Conversation {
    /// Client end
    pub client: Client<MemoryTransport>,
    /// Server end
    pub server: Server<MemoryTransport>,
    to_server: MemoryInbox,
    to_client: MemoryInbox,
    client_log: EventLog,
    server_log: EventLog,
}

impl Conversation {
    /// Connect a client and a server without delivery acknowledgments.
    pub fn new(client: ClientOptions, server: ServerOptions) -> Self {
        Self::with_acks(client, server, false)
    }

    /// Connect a client and a server; with `acked`, every send returns a
    /// completion that resolves on delivery.
    pub fn with_acks(client: ClientOptions, server: ServerOptions, acked: bool) -> Self {
        let (client_transport, to_server) = channel(acked);
        let (server_transport, to_client) = channel(acked);
        let client_log = EventLog::new();
        let server_log = EventLog::new();

        Self {
            client: Client::new(client_transport, client, client_log.callback()),
            server: Server::new(server_transport, server, server_log.callback()),
            to_server,
            to_client,
            client_log,
            server_log,
        }
    }

    /// Events the client's callback received
    pub fn client_log(&self) -> &EventLog {
        &self.client_log
    }

    /// Events the server's callback received
    pub fn server_log(&self) -> &EventLog {
        &self.server_log
    }

    /// Frames queued for the server
    pub fn pending_to_server(&self) -> usize {
        self.to_server.pending()
    }

    /// Frames queued for the client
    pub fn pending_to_client(&self) -> usize {
        self.to_client.pending()
    }

    /// Deliver queued client frames to the server.
    pub fn deliver_to_server(&mut self) -> Result<usize, HarnessError> {
        Ok(self.to_server.pump(&mut self.server)?)
    }

    /// Deliver queued server frames to the client.
    pub fn deliver_to_client(&mut self) -> Result<usize, HarnessError> {
        Ok(self.to_client.pump(&mut self.client)?)
    }

    /// Deliver frames both ways until nothing is queued.
    ///
    /// Returns the number of frames delivered. Stops at the first frame
    /// either side rejects.
    pub fn settle(&mut self) -> Result<usize, HarnessError> {
        let mut total = 0;
        loop {
            let delivered = self.deliver_to_server()? + self.deliver_to_client()?;
            if delivered == 0 {
                trace!(total, "conversation settled");
                return Ok(total);
            }
            total += delivered;
        }
    }
}
