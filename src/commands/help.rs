/// Help text listing every command
pub fn help_text() -> &'static str {
    "snoopy setchannel
    sets the text channel where notifications will be sent
snoopy watchchannel <channel name>
    adds a voice channel to the list of watched voice channels
snoopy unwatchchannel <channel name>
    removes a voice channel from the list of watched voice channels
snoopy watchlist
    shows the notification channel and the watched voice channels
snoopy help
    shows this message

A channel can also be given by id or as a #mention when several voice channels share a name."
}
