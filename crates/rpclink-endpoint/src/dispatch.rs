use std::io::{Read, Write};

use rpclink_frame::FrameError;
use rpclink_proto::{Message, ResponseError};

use crate::endpoint::Shared;

/// Body of the background dispatch worker.
///
/// Decodes inbound frames until the stream ends or the peer signals
/// shutdown, routing responses to their waiting callers and everything
/// else to the inbound hook. There is no transition back from stopped.
pub(crate) fn run<R: Read, W: Write>(shared: &Shared<R, W>) {
    loop {
        match shared.transport.receive() {
            Ok(None) => {
                tracing::info!("server quit");
                break;
            }
            Ok(Some(Message::Response(response))) => {
                let fatal = response
                    .error
                    .as_ref()
                    .is_some_and(ResponseError::is_shutdown);
                shared.deliver(response.id, response.result, response.error);
                if fatal {
                    tracing::info!("server exit");
                    break;
                }
            }
            Ok(Some(message)) => shared.route_inbound(message),
            Err(FrameError::Io(err)) => {
                // The pipe itself failed; orderly closure arrives as
                // Ok(None), so there is nothing left to read here.
                tracing::warn!(error = %err, "inbound pipe failed");
                break;
            }
            Err(err) => {
                // One corrupt frame must not kill the loop, even though
                // a header fault can leave the stream desynchronized.
                tracing::warn!(error = %err, "discarding undecodable message");
            }
        }
    }
}
