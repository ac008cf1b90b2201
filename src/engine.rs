//! The single owner of the running game.
//!
//! Connection tasks never touch the [`Game`]. They post [`EngineEvent`]s to
//! one mailbox, and the engine task applies them strictly in arrival order.

use crate::games::skirmish::{
    DEFAULT_PLAYER1_SETUP, DEFAULT_PLAYER2_SETUP, Game, MoveError, PieceKind, Side,
};
use crate::protocol::{ClientMessage, PieceRef, ServerMessage};
use crate::session::{Audience, ConnectionId, ConnectionRegistry, Role};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Input to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A connection opened and wants the current snapshot.
    Joined {
        /// New connection.
        connection: ConnectionId,
    },
    /// A parsed message from a connection.
    Inbound {
        /// Sender.
        connection: ConnectionId,
        /// The message.
        message: ClientMessage,
    },
    /// A turn timer fired.
    TurnExpired {
        /// Timer generation; stale generations are ignored.
        epoch: u64,
    },
}

/// The engine task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("game engine is not running")]
pub struct EngineClosed;

/// Cloneable mailbox of the engine task.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    events: UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    /// Posts an event.
    ///
    /// # Errors
    ///
    /// [`EngineClosed`] if the engine task has exited.
    pub fn send(&self, event: EngineEvent) -> Result<(), EngineClosed> {
        self.events.send(event).map_err(|_| EngineClosed)
    }
}

/// State owned by the engine task.
pub struct Engine {
    game: Game,
    connections: ConnectionRegistry,
    turn_timeout: Option<Duration>,
    inbox: UnboundedReceiver<EngineEvent>,
    timer_events: WeakUnboundedSender<EngineEvent>,
    timer: Option<JoinHandle<()>>,
    epoch: u64,
}

impl Engine {
    /// Spawns the engine with a standard game.
    ///
    /// `turn_timeout` of `None` disables the turn timer. The task ends once
    /// every [`EngineHandle`] has been dropped.
    #[instrument(skip(connections))]
    pub fn spawn(
        connections: ConnectionRegistry,
        turn_timeout: Option<Duration>,
    ) -> (EngineHandle, JoinHandle<()>) {
        let (events, inbox) = mpsc::unbounded_channel();
        let engine = Self {
            game: Game::standard(),
            connections,
            turn_timeout,
            inbox,
            timer_events: events.downgrade(),
            timer: None,
            epoch: 0,
        };
        let task = tokio::spawn(engine.run());
        (EngineHandle { events }, task)
    }

    async fn run(mut self) {
        info!(turn_timeout = ?self.turn_timeout, "Game engine started");
        self.arm_timer();
        while let Some(event) = self.inbox.recv().await {
            self.handle(event).await;
        }
        self.cancel_timer();
        info!("Game engine stopped");
    }

    async fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Joined { connection } => {
                self.connections
                    .unicast(connection, &ServerMessage::snapshot(&self.game))
                    .await;
            }
            EngineEvent::Inbound {
                connection,
                message,
            } => self.on_message(connection, message).await,
            EngineEvent::TurnExpired { epoch } => self.on_turn_expired(epoch).await,
        }
    }

    #[instrument(skip(self, message), fields(kind = message.kind()))]
    async fn on_message(&mut self, connection: ConnectionId, message: ClientMessage) {
        let Some(role) = self.connections.role_of(connection).await else {
            debug!(%connection, "Message from closed connection");
            return;
        };

        match message {
            ClientMessage::Chat { player, message } => {
                self.connections
                    .broadcast(Audience::Everyone, &ServerMessage::Chat { player, message })
                    .await;
            }
            other if role == Role::Spectator => {
                debug!(%connection, kind = other.kind(), "Ignoring spectator request");
            }
            ClientMessage::Init { player } => {
                self.connections.declare_side(connection, player).await;
            }
            ClientMessage::Move {
                player,
                piece,
                token,
            } => self.on_move(connection, player, piece, token).await,
            ClientMessage::Undo { .. } => self.on_undo(connection).await,
            ClientMessage::Restart {
                player1_setup,
                player2_setup,
            } => {
                self.on_restart(connection, player1_setup, player2_setup)
                    .await
            }
        }
    }

    async fn on_move(&mut self, connection: ConnectionId, side: Side, piece: PieceRef, token: String) {
        if self
            .connections
            .declared_side(connection)
            .await
            .is_some_and(|declared| declared != side)
        {
            debug!(%connection, %side, "Move for a side other than the declared one");
        }
        let selector = match piece.selector() {
            Ok(selector) => selector,
            Err(e) => {
                let error = self.game.turn().authorize(side).err().unwrap_or(e);
                return self.reject(connection, error).await;
            }
        };
        match self.game.apply_move(side, selector, &token) {
            Ok(accepted) => {
                self.publish_snapshot().await;
                match accepted.winner {
                    Some(winner) => {
                        info!(%winner, "Game over");
                        self.cancel_timer();
                        self.connections
                            .broadcast(Audience::Everyone, &ServerMessage::GameOver { winner })
                            .await;
                    }
                    None => self.arm_timer(),
                }
            }
            Err(e) => self.reject(connection, e).await,
        }
    }

    async fn on_undo(&mut self, connection: ConnectionId) {
        match self.game.undo() {
            Ok(_) => {
                self.arm_timer();
                self.publish_snapshot().await;
            }
            Err(e) => self.reject(connection, e).await,
        }
    }

    async fn on_restart(
        &mut self,
        connection: ConnectionId,
        player1: Option<Vec<PieceKind>>,
        player2: Option<Vec<PieceKind>>,
    ) {
        let player1 = player1.as_deref().unwrap_or(&DEFAULT_PLAYER1_SETUP[..]);
        let player2 = player2.as_deref().unwrap_or(&DEFAULT_PLAYER2_SETUP[..]);
        match Game::new(player1, player2) {
            Ok(game) => {
                info!(%connection, "Game restarted");
                self.game = game;
                self.arm_timer();
                self.publish_snapshot().await;
            }
            Err(e) => self.reject(connection, e).await,
        }
    }

    #[instrument(skip(self))]
    async fn on_turn_expired(&mut self, epoch: u64) {
        if epoch != self.epoch {
            debug!(current = self.epoch, "Stale turn timer");
            return;
        }
        match self.game.pass_turn() {
            Ok(next) => {
                info!(%next, "Turn timed out");
                self.arm_timer();
                self.publish_snapshot().await;
            }
            Err(e) => debug!(reason = %e, "Turn timer fired after game end"),
        }
    }

    async fn reject(&self, connection: ConnectionId, error: MoveError) {
        warn!(%connection, kind = %error.kind(), reason = %error, "Request rejected");
        self.connections
            .unicast(
                connection,
                &ServerMessage::InvalidMove {
                    reason: error.to_string(),
                },
            )
            .await;
    }

    async fn publish_snapshot(&self) {
        self.connections
            .broadcast(Audience::Everyone, &ServerMessage::snapshot(&self.game))
            .await;
    }

    /// Replaces any pending timer with a fresh one for the current turn.
    fn arm_timer(&mut self) {
        self.cancel_timer();
        let Some(timeout) = self.turn_timeout else {
            return;
        };
        if self.game.turn().is_over() {
            return;
        }

        let epoch = self.epoch;
        let events = self.timer_events.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(events) = events.upgrade() {
                let _ = events.send(EngineEvent::TurnExpired { epoch });
            }
        }));
        debug!(epoch, ?timeout, "Turn timer armed");
    }

    fn cancel_timer(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
