//! User-facing message texts for the intake conversation (pt-BR).

pub const WELCOME: &str = "Olá! Sou o assistente *Pré-Natal*.\n\n\
*Aviso*: este serviço NÃO substitui atendimento médico. Em emergência, ligue 192 (SAMU).\n\n\
Se você *concorda em participar* e autoriza o uso dos dados para fins acadêmicos \
conforme a LGPD, responda: *ACEITO*.\n\n\
Comandos: *MENU*, *CONTINUAR*, *REINICIAR*, *FIM*, *SAIR*, *APAGAR*.";

pub const CONSENT_CONFIRMED: &str =
    "Obrigado. Consentimento registrado. Vamos começar com algumas perguntas rápidas.";

pub const CONSENT_REQUIRED: &str = "Para iniciar, digite *ACEITO*. Para sair, digite SAIR.";

pub const Q_INITIALS: &str =
    "1) Para preservar a privacidade, informe apenas *iniciais* do seu nome (ex.: A.R.M.).";

pub const Q_AGE: &str = "2) Qual sua *idade* em anos? (ex.: 28)";

pub const Q_GESTATION: &str = "3) Informe a *data da última menstruação (DUM)* em *DD/MM/AAAA*\n   \
*ou* digite apenas as *semanas de gestação* (ex.: 22).";

pub const Q_SYMPTOMS: &str = "4) Você apresenta algum(s) *sintoma(s) agora*? Responda com os números (ex.: 1,3):\n\
1 Sangramento vaginal\n\
2 Dor abdominal intensa\n\
3 Febre (≥ 38°C)\n\
4 Dor de cabeça forte / visão turva / inchaço súbito\n\
5 Náusea/vômito persistente\n\
6 Ausência de movimentos fetais (> 28s)\n\
7 Nenhum dos anteriores";

pub const Q_CONDITIONS: &str = "5) Possui alguma *condição de saúde*? (números, ex.: 1,4)\n\
1 Hipertensão\n\
2 Diabetes\n\
3 Infecção urinária atual\n\
4 Nenhuma";

pub const Q_PRENATAL_VISITS: &str =
    "6) Quantas *consultas de pré-natal* você já realizou nesta gestação? (ex.: 3)";

pub const Q_BLOOD_PRESSURE: &str = "7) Você consegue informar sua *pressão arterial* agora?\n   \
Envie como *12x8*, *12/8*, *12 8* ou *120/80* (ou digite *PULAR*).";

pub const Q_WEIGHT: &str = "8) Informe seu *peso em kg* (ex.: 70). Se não souber, digite *PULAR*.";

pub const Q_HEIGHT: &str =
    "9) Informe sua *altura em metros* (ex.: 1.60). Se não souber, digite *PULAR*.";

pub const Q_HABITS: &str =
    "10) Você usa *tabaco* ou *álcool* atualmente? Responda *1* Sim ou *2* Não.";

pub const NOT_UNDERSTOOD: &str = "Não entendi.";

pub const INVALID_AGE: &str = "Informe uma *idade válida* (ex.: 28).";
pub const AGE_NOT_NUMBER: &str = "Informe a idade em *número* (ex.: 28).";
pub const INVALID_VISITS: &str = "Informe um número *válido* de consultas (ex.: 3).";
pub const HABITS_HINT: &str = "Responda *1* para Sim ou *2* para Não.";

pub const FINAL_MSG: &str = "Obrigado. Avaliando suas respostas…";

pub const EDU_OFFER: &str = "Deseja receber *material educativo* (dicas personalizadas, sinais de alerta e calendário de consultas)?\n\
Responda 1 para *Sim* ou 2 para *Não*.";

pub const EDU_OFFER_HINT: &str = "Responda 1 para *Sim* ou 2 para *Não*.";

pub const EDU_DECLINED: &str =
    "Ok, sem material adicional. Conversa finalizada. Obrigado por participar!";

pub const ALERT_SIGNS: &str = "*Sinais de alerta* — procurar serviço imediatamente / *192 SAMU*:\n\
• Sangramento vaginal\n\
• Dor abdominal forte\n\
• Febre ≥38°C\n\
• Dor de cabeça intensa/visão turva/inchaço súbito\n\
• Ausência de movimentos fetais após 28s";

pub const SESSION_ENDED: &str =
    "Conversa encerrada. Obrigado por participar! Em emergência, 192 (SAMU).";

pub const SESSION_RESTARTED: &str = "Sessão reiniciada. Para iniciar, digite *ACEITO*.";

pub const SESSION_RESET_UNKNOWN: &str = "Sessão reiniciada. Digite *ACEITO* para iniciar.";

pub const DATA_ERASED: &str = "Seus dados foram apagados e a conversa foi encerrada. \
Obrigado! Em emergência, 192 (SAMU).";

pub const UNEXPECTED_ERROR: &str = "Ocorreu um erro inesperado. Tente novamente mais tarde.";

pub const CONTINUE_FALLBACK: &str = "Vamos continuar.";

pub const FAQ_SUFFIX_QUESTIONNAIRE: &str = "Digite *CONTINUAR* para voltar ao questionário, \
*MENU* para ver mais tópicos ou *FIM* para encerrar.";

pub const FAQ_NOT_FOUND_QUESTIONNAIRE: &str = "Não encontrei esse tópico. Digite *MENU* para ver \
as opções ou *CONTINUAR* para seguir o questionário.";

pub const FAQ_SUFFIX_FOLLOW_UP: &str = "Digite *MENU* para mais tópicos ou *FIM* para encerrar.";

pub const FAQ_NOT_FOUND_FOLLOW_UP: &str =
    "Não encontrei esse tópico. Digite *MENU* para ver as opções ou *FIM* para encerrar.";

pub const FOLLOW_UP_CONTINUE: &str =
    "Podemos continuar pelo *MENU* (envie `MENU`) ou encerrar com *FIM*.";

pub const FOLLOW_UP_IDLE: &str = "Se quiser mais informações, envie `MENU` ou `? tema` \
(ex.: `? alimentação`). Para encerrar, mande *FIM*.";

pub const TEST_WEBHOOK_OK: &str =
    "✅ Webhook OK. Use /whatsapp para o fluxo completo. Envie *ACEITO* para começar.";

/// Words treated as a greeting; they repeat the current question.
pub const GREETINGS: &[&str] = &[
    "oi", "olá", "ola", "bom dia", "boa tarde", "boa noite", "hello", "hi",
];

/// Repeat a question after an unparseable answer.
pub fn not_understood(question: &str) -> String {
    format!("{NOT_UNDERSTOOD}\n\n{question}")
}
