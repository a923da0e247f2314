use crate::actions::Action;
use crate::client_message::{Ask, AskPair, AskSelectN, ClientMessage, Notification, Reply};
use crate::errors::MTGError;
use crate::game::Game;
use common::counters::Counters;
use common::entities::{CardId, PlayerId, TargetId};
use common::hashset_obj::HashSetObj;
use common::mana::ManaPool;
use derivative::Derivative;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::ops::DerefMut;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Player {
    pub name: String,
    pub life: i64,
    pub library: Vec<CardId>,
    pub hand: HashSetObj<CardId>,
    pub graveyard: Vec<CardId>,
    pub mana_pool: ManaPool,
    pub counters: Counters,
    pub max_handsize: usize,
    //Set when a draw was attempted from an empty library,
    //the loss is applied by the next state based action check
    pub drew_from_empty: bool,
    pub lost: bool,
    #[derivative(Debug = "ignore")]
    pub player_con: PlayerCon,
}

impl Player {
    pub fn new(name: &str, life: i64, max_handsize: usize, player_con: PlayerCon) -> Self {
        Self {
            name: name.to_owned(),
            life,
            library: Vec::new(),
            hand: HashSetObj::new(),
            graveyard: Vec::new(),
            mana_pool: ManaPool::default(),
            counters: Counters::default(),
            max_handsize,
            drew_from_empty: false,
            lost: false,
            player_con,
        }
    }
}

//A decision maker that lives in the engine's task.
//Every method has a default so scripted clients only override what they test.
pub trait MockClient: Send {
    //An empty selection passes priority
    fn select_action(
        &mut self,
        _game: &Game,
        _player: PlayerId,
        _ask: &AskSelectN<Action>,
    ) -> Vec<usize> {
        Vec::new()
    }
    fn select_targets(
        &mut self,
        _game: &Game,
        _player: PlayerId,
        ask: &AskSelectN<TargetId>,
    ) -> Vec<usize> {
        (0..ask.min).collect()
    }
    //Discarding to hand size and choosing a legendary permanent to keep
    fn select_cards(
        &mut self,
        _game: &Game,
        _player: PlayerId,
        ask: &AskSelectN<CardId>,
    ) -> Vec<usize> {
        (0..ask.min).collect()
    }
    fn select_attackers(
        &mut self,
        _game: &Game,
        _player: PlayerId,
        _ask: &AskPair<TargetId>,
    ) -> HashMap<CardId, Vec<usize>> {
        HashMap::new()
    }
    fn select_blockers(
        &mut self,
        _game: &Game,
        _player: PlayerId,
        _ask: &AskPair<CardId>,
    ) -> HashMap<CardId, Vec<usize>> {
        HashMap::new()
    }
    fn order(&mut self, _game: &Game, _player: PlayerId, ents: &[CardId]) -> Vec<usize> {
        (0..ents.len()).collect()
    }
    fn notify(&mut self, _game: &Game, _player: PlayerId, _notification: &Notification) {}
}

//Passes every decision it can
pub struct PassingClient;
impl MockClient for PassingClient {}

//A request forwarded to a client outside the engine task.
//Asks carry a reply channel, notifications don't.
#[derive(Debug)]
pub struct PlayerRequest {
    pub player: PlayerId,
    pub message: ClientMessage,
    pub reply: Option<oneshot::Sender<serde_json::Value>>,
}

pub enum Socket {
    Mock(Box<dyn MockClient>),
    Channel(mpsc::Sender<PlayerRequest>),
}

#[derive(Clone)]
pub struct PlayerCon {
    socket: Arc<Mutex<Socket>>,
}
impl Debug for PlayerCon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerCon")
            .field("socket", &"socket")
            .finish()
    }
}

impl PlayerCon {
    pub fn new_mock(client: impl MockClient + 'static) -> Self {
        PlayerCon {
            socket: Arc::new(Mutex::new(Socket::Mock(Box::new(client)))),
        }
    }
    //Returns the connection and the receiving end an external task reads requests from
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<PlayerRequest>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let con = PlayerCon {
            socket: Arc::new(Mutex::new(Socket::Channel(tx))),
        };
        (con, rx)
    }
    async fn request(&self, game: &Game, player: PlayerId, ask: &Ask) -> Result<Reply, MTGError> {
        let mut socket = self.socket.lock().await;
        match socket.deref_mut() {
            Socket::Mock(client) => Ok(match ask {
                Ask::Action(ask) => Reply::Selection(client.select_action(game, player, ask)),
                Ask::Target(ask) => Reply::Selection(client.select_targets(game, player, ask)),
                Ask::DiscardToHandSize(ask) | Ask::LegendRule(ask) => {
                    Reply::Selection(client.select_cards(game, player, ask))
                }
                Ask::Attackers(ask) => Reply::Pairing(client.select_attackers(game, player, ask)),
                Ask::Blockers(ask) => Reply::Pairing(client.select_blockers(game, player, ask)),
                Ask::DamageOrder { blockers, .. } => {
                    Reply::Selection(client.order(game, player, &blockers.ents))
                }
                Ask::TriggerOrder(ask) => Reply::Selection(client.order(game, player, &ask.ents)),
            }),
            Socket::Channel(tx) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                let request = PlayerRequest {
                    player,
                    message: ClientMessage::AskUser(ask.clone()),
                    reply: Some(reply_tx),
                };
                tx.send(request)
                    .await
                    .map_err(|_| MTGError::ClientDisconnected(player))?;
                let value = reply_rx
                    .await
                    .map_err(|_| MTGError::ClientDisconnected(player))?;
                Ok(parse_reply(ask, value))
            }
        }
    }
    async fn notify(
        &self,
        game: &Game,
        player: PlayerId,
        notification: Notification,
    ) -> Result<(), MTGError> {
        let mut socket = self.socket.lock().await;
        match socket.deref_mut() {
            Socket::Mock(client) => {
                client.notify(game, player, &notification);
                Ok(())
            }
            Socket::Channel(tx) => {
                let request = PlayerRequest {
                    player,
                    message: ClientMessage::Notify(notification),
                    reply: None,
                };
                tx.send(request)
                    .await
                    .map_err(|_| MTGError::ClientDisconnected(player))
            }
        }
    }
}

fn parse_reply(ask: &Ask, value: serde_json::Value) -> Reply {
    if ask.pair_bounds().is_some() {
        serde_json::from_value(value)
            .map(Reply::Pairing)
            .unwrap_or(Reply::Malformed)
    } else {
        serde_json::from_value(value)
            .map(Reply::Selection)
            .unwrap_or(Reply::Malformed)
    }
}

fn valid_selection(selection: &[usize], len: usize, min: usize, max: usize) -> bool {
    let unique: HashSet<&usize> = selection.iter().collect();
    unique.len() == selection.len()
        && selection.len() >= min
        && selection.len() <= max
        && selection.iter().all(|&i| i < len)
}

//Returns the reply if it answers the ask
fn validate_reply(ask: &Ask, reply: Reply) -> Option<Reply> {
    let valid = match &reply {
        Reply::Selection(selection) => {
            if let Some((len, min, max)) = ask.selection_bounds() {
                valid_selection(selection, len, min, max)
            } else if let Some(len) = ask.order_len() {
                valid_selection(selection, len, len, len)
            } else {
                false
            }
        }
        Reply::Pairing(pairing) => match ask.pair_bounds() {
            Some(bounds) => {
                pairing.keys().all(|key| bounds.contains_key(key))
                    && bounds.iter().all(|(key, &(len, min, max))| {
                        let chosen = pairing.get(key).map(|v| v.as_slice()).unwrap_or(&[]);
                        valid_selection(chosen, len, min, max)
                    })
            }
            None => false,
        },
        Reply::Malformed => false,
    };
    if valid {
        Some(reply)
    } else {
        None
    }
}

impl Game {
    //Asks a player until they answer within the bounds of the ask
    pub async fn ask_user(&self, player: PlayerId, ask: &Ask) -> Result<Reply, MTGError> {
        let con = self
            .players
            .get(player)
            .ok_or(MTGError::PlayerDoesntExist(player))?
            .player_con
            .clone();
        let mut invalid = 0;
        loop {
            let reply = con.request(self, player, ask).await?;
            if let Some(reply) = validate_reply(ask, reply) {
                debug!("{} answered {:?}", player, reply);
                return Ok(reply);
            }
            invalid += 1;
            warn!("{} sent an invalid reply ({} so far)", player, invalid);
            if invalid > self.config.max_invalid_replies {
                return Err(MTGError::UnresponsiveClient(player));
            }
        }
    }
    pub async fn ask_selection(&self, player: PlayerId, ask: Ask) -> Result<Vec<usize>, MTGError> {
        match self.ask_user(player, &ask).await? {
            Reply::Selection(selection) => Ok(selection),
            _ => Err(MTGError::UnresponsiveClient(player)),
        }
    }
    pub async fn ask_pairing(
        &self,
        player: PlayerId,
        ask: Ask,
    ) -> Result<HashMap<CardId, Vec<usize>>, MTGError> {
        match self.ask_user(player, &ask).await? {
            Reply::Pairing(pairing) => Ok(pairing),
            _ => Err(MTGError::UnresponsiveClient(player)),
        }
    }
    //Returns the entities in the order the player chose
    pub async fn ask_order(
        &self,
        player: PlayerId,
        ents: Vec<CardId>,
        wrap: impl FnOnce(Vec<CardId>) -> Ask,
    ) -> Result<Vec<CardId>, MTGError> {
        if ents.len() < 2 {
            return Ok(ents);
        }
        let order = self.ask_selection(player, wrap(ents.clone())).await?;
        Ok(order.into_iter().map(|i| ents[i]).collect())
    }
    pub async fn notify(&self, player: PlayerId, notification: Notification) -> Result<(), MTGError> {
        let con = self
            .players
            .get(player)
            .ok_or(MTGError::PlayerDoesntExist(player))?
            .player_con
            .clone();
        con.notify(self, player, notification).await
    }
}
