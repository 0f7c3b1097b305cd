use irnetbox::{
    link::{Audit, AuditOption},
    prelude::*,
};
use irnetbox_driver::params::{
    MODEL_MK2, MSG_CPLD_INSTRUCTION, MSG_DEVICE_VERSION, MSG_DOWNLOAD_SIGNAL, MSG_INDICATORS_ON,
    MSG_OUTPUT_IR, MSG_OUTPUT_IR_ASYNC, MSG_POWER_ON, MSG_RESET, MSG_SET_MEMORY,
};

fn open(option: AuditOption) -> IrNetBox<Audit> {
    IrNetBox::open(Audit::new(option), IrNetBoxOption::default()).unwrap()
}

fn mk2() -> AuditOption {
    AuditOption {
        model_code: MODEL_MK2,
        ..AuditOption::default()
    }
}

fn negotiation_count(device: &IrNetBox<Audit>) -> usize {
    device.with_link(|link| {
        link.log()
            .iter()
            .filter(|t| **t == MSG_DEVICE_VERSION)
            .count()
    })
}

#[test]
fn modern_success() {
    let device = open(AuditOption::default());
    let signal = [0x42u8; 40];

    let completion = device.send(3, 75, &signal).unwrap();
    assert!(completion.is_confirmed());

    device.with_link(|link| {
        let fired = link.fired();
        assert_eq!(1, fired.len());
        assert_eq!((3, 75), (fired[0].port, fired[0].power));
        assert_eq!(signal.to_vec(), fired[0].data);
        assert_eq!(
            vec![MSG_DEVICE_VERSION, MSG_POWER_ON, MSG_OUTPUT_IR_ASYNC],
            link.log().to_vec()
        );
    });
}

#[test]
fn device_info_is_cached() {
    let device = open(AuditOption::default());

    let info = device.device_info().unwrap();
    assert_eq!(HardwareModel::Mk4, info.model);
    assert_eq!(16, info.port_count);
    assert_eq!(ProtocolGeneration::Modern, info.generation());

    let _ = device.device_info().unwrap();
    assert_eq!(1, negotiation_count(&device));
}

#[test]
fn legacy_rejection_aborts_before_download() {
    let device = open(mk2());
    device.with_link(|link| link.set_reject(MSG_CPLD_INSTRUCTION, 5));

    let err = device.send(1, 50, &[0x01]).unwrap_err();
    assert!(matches!(
        err,
        IrNetBoxError::Transmit(TransmitError::DeviceRejected(5))
    ));
    assert!(!err.requires_reconnect());
    device.with_link(|link| {
        assert!(!link.log().contains(&MSG_DOWNLOAD_SIGNAL));
        assert!(!link.log().contains(&MSG_OUTPUT_IR));
    });

    // The device answered cleanly, so the connection is still cached.
    device.with_link(|link| link.clear_reject());
    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());
    assert_eq!(1, negotiation_count(&device));
}

#[test]
fn legacy_full_step_sequence() {
    let device = open(mk2());

    assert!(device.send(2, 80, &[0x10, 0x20]).unwrap().is_confirmed());
    device.with_link(|link| {
        assert_eq!(
            vec![
                MSG_DEVICE_VERSION,
                MSG_POWER_ON,
                MSG_RESET,
                MSG_INDICATORS_ON,
                MSG_SET_MEMORY,
                MSG_CPLD_INSTRUCTION,
                MSG_CPLD_INSTRUCTION,
                MSG_DOWNLOAD_SIGNAL,
                MSG_OUTPUT_IR,
                MSG_RESET,
            ],
            link.log().to_vec()
        );
        assert_eq!(2, link.fired()[0].port);
    });
}

#[test]
fn legacy_indicators_rejection_is_soft() {
    let device = open(mk2());
    device.with_link(|link| link.set_reject(MSG_INDICATORS_ON, 7));

    assert!(device.send(1, 10, &[0xAA]).unwrap().is_confirmed());
    device.with_link(|link| assert!(link.log().contains(&MSG_OUTPUT_IR)));
}

#[test]
fn timeout_discards_link() {
    let device = open(AuditOption::default());
    device.with_link(|link| link.set_swallow(MSG_OUTPUT_IR_ASYNC));

    let err = device.send(1, 50, &[0x01]).unwrap_err();
    assert!(matches!(
        err,
        IrNetBoxError::Transmit(TransmitError::Link(LinkError::Timeout))
    ));
    assert!(err.requires_reconnect());

    // The next call reconnects and renegotiates from scratch.
    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());
    assert_eq!(2, negotiation_count(&device));
}

#[test]
fn stray_completion_is_ignored() {
    let device = open(AuditOption::default());
    device.with_link(|link| link.set_stray_completion(true));

    assert!(device.send(5, 100, &[0x01, 0x02]).unwrap().is_confirmed());
}

#[test]
fn completion_timeout_is_soft_but_discards_link() {
    let device = open(AuditOption::default());
    device.with_link(|link| link.set_drop_completion(true));

    let completion = device.send(1, 50, &[0x01]).unwrap();
    assert_eq!(Completion::Unconfirmed, completion);

    // The connection is dropped: a late completion would desynchronize it.
    device.with_link(|link| link.set_drop_completion(false));
    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());
    assert_eq!(2, negotiation_count(&device));
}

#[test]
fn negotiation_failure_is_fatal() {
    let mut audit = Audit::new(AuditOption::default());
    audit.set_version_payload(vec![3, 1]);

    let err = IrNetBox::open(audit, IrNetBoxOption::default()).unwrap_err();
    assert!(matches!(
        err,
        IrNetBoxError::Negotiation(NegotiationError::ShortPayload(2))
    ));
}

#[test]
fn broken_link_recovers_on_next_call() {
    let device = open(AuditOption::default());
    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());

    device.with_link(|link| link.break_down());
    let err = device.send(1, 50, &[0x01]).unwrap_err();
    assert!(err.requires_reconnect());

    device.with_link(|link| link.repair());
    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());
    assert_eq!(2, negotiation_count(&device));
}

#[rstest::rstest]
#[test]
#[case(3, ProtocolGeneration::Legacy, MSG_OUTPUT_IR)]
#[case(0x40, ProtocolGeneration::Modern, MSG_OUTPUT_IR_ASYNC)]
fn unknown_models_classify_by_threshold(
    #[case] model_code: u8,
    #[case] generation: ProtocolGeneration,
    #[case] fire_message: u8,
) {
    let device = open(AuditOption {
        model_code,
        ..AuditOption::default()
    });

    let info = device.device_info().unwrap();
    assert_eq!(HardwareModel::Unknown(model_code), info.model);
    assert_eq!(generation, info.generation());

    assert!(device.send(1, 50, &[0x01]).unwrap().is_confirmed());
    device.with_link(|link| assert!(link.log().contains(&fire_message)));
}

#[test]
fn utility_commands_drive_device_state() {
    let device = open(AuditOption::default());

    device.power_on().unwrap();
    device.indicators_on().unwrap();
    device.with_link(|link| {
        assert!(link.powered());
        assert!(link.indicators());
    });

    device.indicators_off().unwrap();
    device.power_off().unwrap();
    device.with_link(|link| {
        assert!(!link.powered());
        assert!(!link.indicators());
    });
}

#[test]
fn invalid_arguments_are_rejected_locally() {
    let device = open(AuditOption::default());

    assert!(matches!(
        device.send(0, 50, &[0x01]).unwrap_err(),
        IrNetBoxError::Transmit(TransmitError::InvalidPort { port: 0, .. })
    ));
    assert!(matches!(
        device.send(1, 101, &[0x01]).unwrap_err(),
        IrNetBoxError::Transmit(TransmitError::InvalidPower(101))
    ));
    // Argument validation happens before any transmission frame.
    device.with_link(|link| assert!(!link.log().contains(&MSG_OUTPUT_IR_ASYNC)));
}
